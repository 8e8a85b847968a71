/// Filter expression tokenizer.
use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen, // (
    RParen, // )
    // Comparison operators
    Eq, // == or ===
    Ne, // != or !==
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !
    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    // Literals and identifiers
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    // Keywords
    True,
    False,
    Null,
}

pub fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        // Skip whitespace
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Three-char operators
        if bytes[i..].starts_with(b"===") {
            tokens.push(Token::Eq);
            i += 3;
            continue;
        }
        if bytes[i..].starts_with(b"!==") {
            tokens.push(Token::Ne);
            i += 3;
            continue;
        }

        // Two-char operators
        if i + 1 < bytes.len() {
            let tok = match (bytes[i], bytes[i + 1]) {
                (b'=', b'=') => Some(Token::Eq),
                (b'!', b'=') => Some(Token::Ne),
                (b'<', b'=') => Some(Token::Le),
                (b'>', b'=') => Some(Token::Ge),
                (b'&', b'&') => Some(Token::AndAnd),
                (b'|', b'|') => Some(Token::OrOr),
                _ => None,
            };
            if let Some(tok) = tok {
                tokens.push(tok);
                i += 2;
                continue;
            }
        }

        // Single-char tokens (after two-char checks so `<` doesn't eat `<=`)
        let single = match bytes[i] {
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'<' => Some(Token::Lt),
            b'>' => Some(Token::Gt),
            b'!' => Some(Token::Bang),
            b'+' => Some(Token::Plus),
            b'*' => Some(Token::Star),
            b'/' => Some(Token::Slash),
            b'%' => Some(Token::Percent),
            _ => None,
        };
        if let Some(tok) = single {
            tokens.push(tok);
            i += 1;
            continue;
        }

        if bytes[i] == b'-' {
            // Negative literal unless the previous token produces a value,
            // so `a - 1` stays a subtraction.
            if i + 1 < bytes.len()
                && (bytes[i + 1].is_ascii_digit() || bytes[i + 1] == b'.')
                && !is_value_token(tokens.last())
            {
                let (tok, consumed) = lex_number(bytes, i)?;
                tokens.push(tok);
                i += consumed;
                continue;
            }
            tokens.push(Token::Minus);
            i += 1;
            continue;
        }

        // String literal
        if bytes[i] == b'"' || bytes[i] == b'\'' {
            let (s, consumed) = lex_string(bytes, i)?;
            tokens.push(Token::Str(s));
            i += consumed;
            continue;
        }

        // Number, including a leading-dot decimal like .5
        if bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit())
        {
            let (tok, consumed) = lex_number(bytes, i)?;
            tokens.push(tok);
            i += consumed;
            continue;
        }

        // Identifier or keyword
        if bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' || bytes[i] == b'$' {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            let word = &input[start..i];
            let tok = match word {
                "true" => Token::True,
                "false" => Token::False,
                "null" => Token::Null,
                _ => Token::Ident(word.to_string()),
            };
            tokens.push(tok);
            continue;
        }

        let ch = input[i..].chars().next().unwrap_or('?');
        bail!("unexpected character '{ch}' at position {i}");
    }

    Ok(tokens)
}

/// Returns true if the token is a value-producing token (for minus disambiguation).
fn is_value_token(tok: Option<&Token>) -> bool {
    matches!(
        tok,
        Some(
            Token::RParen
                | Token::Ident(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Str(_)
                | Token::True
                | Token::False
                | Token::Null
        )
    )
}

fn lex_string(bytes: &[u8], start: usize) -> Result<(String, usize)> {
    let quote = bytes[start];
    let mut i = start + 1;
    let mut s = String::new();

    while i < bytes.len() {
        match bytes[i] {
            b if b == quote => return Ok((s, i + 1 - start)),
            b'\\' => {
                i += 1;
                if i >= bytes.len() {
                    bail!("unterminated string escape");
                }
                match bytes[i] {
                    b'"' => s.push('"'),
                    b'\'' => s.push('\''),
                    b'\\' => s.push('\\'),
                    b'/' => s.push('/'),
                    b'n' => s.push('\n'),
                    b'r' => s.push('\r'),
                    b't' => s.push('\t'),
                    b'b' => s.push('\x08'),
                    b'f' => s.push('\x0c'),
                    b'u' => {
                        // \uXXXX
                        if i + 4 >= bytes.len() {
                            bail!("incomplete \\u escape");
                        }
                        let hex = std::str::from_utf8(&bytes[i + 1..i + 5])?;
                        let cp = u16::from_str_radix(hex, 16)?;
                        match char::from_u32(cp as u32) {
                            Some(c) => s.push(c),
                            None => bail!("invalid \\u escape '{hex}'"),
                        }
                        i += 4;
                    }
                    c => bail!("unknown escape '\\{}'", c as char),
                }
                i += 1;
            }
            _ => {
                // Fast path: scan for next special char
                let chunk_start = i;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\\' {
                    i += 1;
                }
                s.push_str(std::str::from_utf8(&bytes[chunk_start..i])?);
            }
        }
    }
    bail!("unterminated string starting at position {start}");
}

fn lex_number(bytes: &[u8], start: usize) -> Result<(Token, usize)> {
    let mut i = start;
    let mut is_float = false;

    // Optional minus
    if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
    }

    // Integer part
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    // Fraction
    if i < bytes.len() && bytes[i] == b'.' {
        is_float = true;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    // Exponent
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        is_float = true;
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            bail!("malformed exponent in number at position {start}");
        }
    }

    let text = std::str::from_utf8(&bytes[start..i])?;
    let consumed = i - start;

    if !is_float && let Ok(n) = text.parse::<i64>() {
        return Ok((Token::Int(n), consumed));
    }
    let f: f64 = text.parse()?;
    Ok((Token::Float(f), consumed))
}
