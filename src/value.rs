/// Scalar cell value of a parsed row.
///
/// Uses `Int(i64)` for integral numbers and `Double(f64)` for everything
/// else numeric. Empty cells are `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// Numbers at or beyond this magnitude stay strings (2^53).
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

impl Value {
    /// Returns the type name used in evaluation error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Returns true unless the value is `false`, `null`, zero, NaN or `""`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Double(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Infer a typed value from one raw field.
    ///
    /// Empty → `Null`, `true`/`TRUE`/`false`/`FALSE` → `Bool`, decimal text
    /// within ±2^53 → number, anything else → `String`.
    pub fn infer(field: &str) -> Value {
        match field {
            "" => return Value::Null,
            "true" | "TRUE" => return Value::Bool(true),
            "false" | "FALSE" => return Value::Bool(false),
            _ => {}
        }
        match scan_number(field) {
            Some(NumberShape::Integer) => {
                if let Ok(n) = field.trim().parse::<i64>()
                    && (n as f64).abs() < MAX_EXACT
                {
                    return Value::Int(n);
                }
            }
            Some(NumberShape::Decimal) => {
                if let Ok(f) = field.trim().parse::<f64>()
                    && f.abs() < MAX_EXACT
                {
                    return Value::Double(f);
                }
            }
            None => {}
        }
        Value::String(field.to_string())
    }
}

#[derive(Debug, PartialEq)]
enum NumberShape {
    Integer,
    Decimal,
}

/// Match `\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*`.
fn scan_number(text: &str) -> Option<NumberShape> {
    let bytes = text.trim().as_bytes();
    let mut i = 0;
    let mut shape = NumberShape::Integer;

    if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        shape = NumberShape::Decimal;
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if int_digits == 0 && i == frac_start {
            return None;
        }
    } else if int_digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        shape = NumberShape::Decimal;
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    (i == bytes.len()).then_some(shape)
}
