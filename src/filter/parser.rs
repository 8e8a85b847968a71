/// Recursive descent parser for filter expressions.
///
/// Grammar (lowest precedence first):
///   expr           = or
///   or             = and ("||" and)*
///   and            = equality ("&&" equality)*
///   equality       = relational (("==" | "!=") relational)*
///   relational     = additive (("<" | "<=" | ">" | ">=") additive)*
///   additive       = multiplicative (("+" | "-") multiplicative)*
///   multiplicative = unary (("*" | "/" | "%") unary)*
///   unary          = ("!" | "-") unary | primary
///   primary        = literal | column | "(" expr ")"
use anyhow::{Result, bail};

use super::lexer::Token;
use super::{ArithOp, BoolOp, CmpOp, Expr};
use crate::schema::Schema;
use crate::value::Value;

/// Limit on expression tree depth: parentheses, unary operators and each
/// link of a binary operator chain all count.
const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    schema: &'a Schema,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], schema: &'a Schema) -> Self {
        Self {
            tokens,
            pos: 0,
            schema,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => bail!("expected {expected:?}, got {tok:?}"),
            None => bail!("expected {expected:?}, got end of input"),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            bail!("expression nested deeper than {MAX_DEPTH} levels");
        }
        Ok(())
    }

    // expr = or
    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    // or = and ("||" and)*
    fn parse_or(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            self.enter()?;
            let right = self.parse_and()?;
            left = Expr::BoolOp(Box::new(left), BoolOp::Or, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // and = equality ("&&" equality)*
    fn parse_and(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_equality()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            self.enter()?;
            let right = self.parse_equality()?;
            left = Expr::BoolOp(Box::new(left), BoolOp::And, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // equality = relational (("==" | "!=") relational)*
    fn parse_equality(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CmpOp::Eq,
                Some(Token::Ne) => CmpOp::Ne,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_relational()?;
            left = Expr::Compare(Box::new(left), op, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // relational = additive (cmp_op additive)*
    fn parse_relational(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CmpOp::Lt,
                Some(Token::Le) => CmpOp::Le,
                Some(Token::Gt) => CmpOp::Gt,
                Some(Token::Ge) => CmpOp::Ge,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_additive()?;
            left = Expr::Compare(Box::new(left), op, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // additive = multiplicative (("+"|"-") multiplicative)*
    fn parse_additive(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Arith(Box::new(left), op, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // multiplicative = unary (("*"|"/"|"%") unary)*
    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::Percent) => ArithOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_unary()?;
            left = Expr::Arith(Box::new(left), op, Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    // unary = ("!" | "-") unary | primary
    fn parse_unary(&mut self) -> Result<Expr> {
        let wrap: fn(Box<Expr>) -> Expr = match self.peek() {
            Some(Token::Bang) => Expr::Not,
            Some(Token::Minus) => Expr::Neg,
            _ => return self.parse_primary(),
        };
        self.advance();
        self.enter()?;
        let inner = self.parse_unary()?;
        self.depth -= 1;
        Ok(wrap(Box::new(inner)))
    }

    // primary = literal | column | "(" expr ")"
    fn parse_primary(&mut self) -> Result<Expr> {
        let tok = match self.advance() {
            Some(tok) => tok.clone(),
            None => bail!("unexpected end of expression"),
        };
        match tok {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(f) => Ok(Expr::Literal(Value::Double(f))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::Ident(name) => match self.schema.index_of(&name) {
                Ok(index) => Ok(Expr::Column(index)),
                Err(_) => bail!("unknown column '{name}'"),
            },
            Token::LParen => {
                self.enter()?;
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                self.depth -= 1;
                Ok(expr)
            }
            other => bail!("unexpected token {other:?}"),
        }
    }
}

/// Parse a full token stream; trailing tokens are an error.
pub fn parse(tokens: &[Token], schema: &Schema) -> Result<Expr> {
    if tokens.is_empty() {
        bail!("empty expression");
    }
    let mut parser = Parser::new(tokens, schema);
    let expr = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        bail!("unexpected token {tok:?} after expression");
    }
    Ok(expr)
}
