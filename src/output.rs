/// CSV output: the single sink every surviving row is written through.
///
/// Fields are written straight into the `csv` writer's buffer. Integers go
/// through `itoa`, doubles through `ryu` re-laid out to match the usual
/// script-runtime number text (`2.5`, `1e-7`, `1e+21`).
use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{Error, Result};
use crate::value::Value;

/// Ordered CSV destination: one header, then rows.
pub struct Sink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
    rows: u64,
    scratch: String,
}

impl<W: Write> Sink<W> {
    pub fn new(out: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b',')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(out);
        Self {
            writer,
            header_written: false,
            rows: 0,
            scratch: String::new(),
        }
    }

    /// Write the header line. Must be called exactly once, before any row.
    pub fn write_header<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<()> {
        if self.header_written {
            return Err(Error::Write("header already written".into()));
        }
        self.writer
            .write_record(columns.iter().map(|c| c.as_ref().as_bytes()))
            .map_err(write_error)?;
        self.header_written = true;
        Ok(())
    }

    /// Serialize one row as a complete line.
    pub fn write_row<'v, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        if !self.header_written {
            return Err(Error::Write("row written before header".into()));
        }
        self.write_values(values)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush buffered lines and hand back the destination.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| Error::Write(e.to_string()))?;
        self.writer
            .into_inner()
            .map_err(|e| Error::Write(e.to_string()))
    }

    fn write_values<'v, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        for value in values {
            let written = match value {
                Value::Null => self.writer.write_field(b""),
                Value::Bool(true) => self.writer.write_field(b"true"),
                Value::Bool(false) => self.writer.write_field(b"false"),
                Value::Int(n) => {
                    let mut buf = itoa::Buffer::new();
                    self.writer.write_field(buf.format(*n))
                }
                Value::Double(f) => {
                    self.scratch.clear();
                    format_double(*f, &mut self.scratch);
                    self.writer.write_field(self.scratch.as_bytes())
                }
                Value::String(s) => self.writer.write_field(s.as_bytes()),
            };
            written.map_err(write_error)?;
        }
        self.writer.write_record(None::<&[u8]>).map_err(write_error)
    }
}

fn write_error(err: csv::Error) -> Error {
    Error::Write(err.to_string())
}

/// Render one row as a CSV line including its trailing newline.
pub fn encode_line<'v, I>(values: I) -> Result<String>
where
    I: IntoIterator<Item = &'v Value>,
{
    let mut sink = Sink::new(Vec::new());
    sink.write_values(values)?;
    let bytes = sink.finish()?;
    String::from_utf8(bytes).map_err(|e| Error::Write(e.to_string()))
}

/// Append the text form of `f`.
///
/// Shortest round-trip digits from `ryu`, laid out as plain decimal when
/// the decimal exponent is in `-6..21`, otherwise `d.ddde±x`. NaN and
/// infinities are spelled `NaN`, `Infinity`, `-Infinity`; `-0` prints `0`.
pub fn format_double(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("NaN");
        return;
    }
    if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    if f == 0.0 {
        out.push('0');
        return;
    }
    if f < 0.0 {
        out.push('-');
    }

    let mut buf = ryu::Buffer::new();
    let s = buf.format_finite(f.abs());
    let (mantissa, exp) = match s.find('e') {
        Some(e_pos) => (&s[..e_pos], s[e_pos + 1..].parse::<i32>().unwrap_or(0)),
        None => (s, 0),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(d) => (&mantissa[..d], &mantissa[d + 1..]),
        None => (mantissa, ""),
    };

    // value = 0.DIGITS × 10^point
    let mut digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let mut point = int_part.len() as i32 + exp;
    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    point -= leading as i32;
    digits.truncate(digits.trim_end_matches('0').len());

    let k = digits.len() as i32;
    let n = point;
    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-n) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let e = n - 1;
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        let mut ibuf = itoa::Buffer::new();
        out.push_str(ibuf.format(e.unsigned_abs()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use std::io;

    fn fmt(f: f64) -> String {
        let mut s = String::new();
        format_double(f, &mut s);
        s
    }

    fn line(values: &[Value]) -> String {
        encode_line(values).unwrap()
    }

    #[test]
    fn doubles_plain_range() {
        assert_eq!(fmt(48.85341), "48.85341");
        assert_eq!(fmt(-0.5), "-0.5");
        assert_eq!(fmt(5.0), "5");
        assert_eq!(fmt(1000.0), "1000");
        assert_eq!(fmt(0.025), "0.025");
        assert_eq!(fmt(0.000001), "0.000001");
        assert_eq!(fmt(123456789.125), "123456789.125");
        assert_eq!(fmt(1e20), "100000000000000000000");
    }

    #[test]
    fn doubles_exponent_range() {
        assert_eq!(fmt(1e-7), "1e-7");
        assert_eq!(fmt(1.5e-7), "1.5e-7");
        assert_eq!(fmt(1e21), "1e+21");
        assert_eq!(fmt(-2.5e22), "-2.5e+22");
    }

    #[test]
    fn doubles_special_values() {
        assert_eq!(fmt(0.0), "0");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(f64::NAN), "NaN");
        assert_eq!(fmt(f64::INFINITY), "Infinity");
        assert_eq!(fmt(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn scalar_fields() {
        assert_eq!(
            line(&[
                Value::Int(2988507),
                Value::String("Paris".into()),
                Value::Double(48.85341),
                Value::Bool(true),
                Value::Null,
            ]),
            "2988507,Paris,48.85341,true,\n"
        );
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(
            line(&[Value::String("Paris,Lutece".into()), Value::Int(1)]),
            "\"Paris,Lutece\",1\n"
        );
        assert_eq!(
            line(&[Value::String("say \"hi\"".into())]),
            "\"say \"\"hi\"\"\"\n"
        );
        assert_eq!(
            line(&[Value::String("two\nlines".into()), Value::Null]),
            "\"two\nlines\",\n"
        );
    }

    #[test]
    fn header_then_rows() {
        let mut sink = Sink::new(Vec::new());
        sink.write_header(&["id", "name"]).unwrap();
        sink.write_row(&[Value::Int(1), Value::String("Paris".into())])
            .unwrap();
        sink.write_row(&[Value::Int(2), Value::String("Lyon".into())])
            .unwrap();
        assert_eq!(sink.rows_written(), 2);
        let out = sink.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,Paris\n2,Lyon\n");
    }

    #[test]
    fn header_is_written_once() {
        let mut sink = Sink::new(Vec::new());
        sink.write_header(&["id"]).unwrap();
        let err = sink.write_header(&["id"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[test]
    fn row_before_header_is_rejected() {
        let mut sink = Sink::new(Vec::new());
        let err = sink.write_row(&[Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[derive(Debug)]
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn destination_failure_is_write_error() {
        let mut sink = Sink::new(BrokenPipe);
        sink.write_header(&["id"]).unwrap();
        let err = sink.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(err.to_string().contains("pipe closed"), "{err}");
    }

    proptest! {
        #[test]
        fn string_fields_survive_a_csv_reader(
            fields in prop::collection::vec("[a-zA-Z0-9 ,;\"'\\té\\n-]{0,12}", 2..6)
        ) {
            let values: Vec<Value> = fields.iter().cloned().map(Value::String).collect();
            let line = encode_line(&values).unwrap();
            prop_assert!(line.ends_with('\n'));

            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_reader(line.as_bytes());
            let record = reader.records().next().unwrap().unwrap();
            let parsed: Vec<&str> = record.iter().collect();
            prop_assert_eq!(parsed, fields.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
