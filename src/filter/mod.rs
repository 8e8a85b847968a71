pub mod eval;
pub mod lexer;
pub mod parser;
mod value_ops;

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;

/// A filter expression AST node.
///
/// Column references are resolved to row positions at parse time, so
/// evaluation only indexes into the row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value: `42`, `"P"`, `true`, `null`
    Literal(Value),
    /// Column reference by source position: `population`
    Column(usize),
    /// Logical negation: `!expr`
    Not(Box<Expr>),
    /// Unary minus: `-expr`
    Neg(Box<Expr>),
    /// Comparison: `a == b`, `a > b`, etc.
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    /// Arithmetic: `a + b`, `a % b`, etc.
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    /// Short-circuit boolean: `a && b`, `a || b`
    BoolOp(Box<Expr>, BoolOp, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl Expr {
    /// Collect the column positions this expression reads.
    pub fn collect_columns(&self, out: &mut Vec<usize>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Column(i) => {
                if !out.contains(i) {
                    out.push(*i);
                }
            }
            Expr::Not(inner) | Expr::Neg(inner) => inner.collect_columns(out),
            Expr::Compare(l, _, r) | Expr::Arith(l, _, r) | Expr::BoolOp(l, _, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
        }
    }
}

/// Parse an expression string into an AST, resolving identifiers against `schema`.
pub fn parse(input: &str, schema: &Schema) -> anyhow::Result<Expr> {
    let tokens = lexer::lex(input)?;
    parser::parse(&tokens, schema)
}

/// A row predicate compiled once and evaluated per row.
#[derive(Debug, Clone)]
pub struct Predicate {
    source: String,
    expr: Expr,
}

impl Predicate {
    /// Compile `source` against `schema`.
    ///
    /// Syntax errors and references to unknown columns fail here, before
    /// any row is read.
    pub fn compile(source: &str, schema: &Schema) -> Result<Self> {
        let expr = parse(source, schema)
            .map_err(|e| Error::Predicate(format!("failed to compile '{source}': {e:#}")))?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against one row; `true` keeps the row.
    pub fn evaluate(&self, row: &[Value]) -> Result<bool> {
        eval::eval(&self.expr, row)
            .map(|v| v.is_truthy())
            .map_err(|msg| Error::Predicate(format!("'{}': {msg}", self.source)))
    }
}

/// One-shot compile and evaluate.
pub fn evaluate(expression: &str, schema: &Schema, row: &[Value]) -> Result<bool> {
    Predicate::compile(expression, schema)?.evaluate(row)
}
