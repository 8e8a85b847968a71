//! Tab-delimited input: one typed [`Row`] per non-blank line.
//!
//! The source files are plain TSV without quoting, so quote characters are
//! ordinary data. Reading is pull-based: each call to [`RowReader::next_row`]
//! consumes only as many bytes as the next line needs.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{Error, Result};
use crate::value::Value;

/// One parsed line, positionally aligned with the schema.
pub type Row = Vec<Value>;

/// Pulls typed rows out of a tab-delimited byte stream.
pub struct RowReader<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    entry: String,
    width: usize,
    rows: u64,
}

impl<R: Read> RowReader<R> {
    /// `width` is the number of fields every line must have; `entry` names
    /// the stream in error messages.
    pub fn new(input: R, entry: &str, width: usize) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(input);
        Self {
            reader,
            record: StringRecord::new(),
            entry: entry.to_string(),
            width,
            rows: 0,
        }
    }

    /// Read the next row into `row`, reusing its allocation.
    ///
    /// Returns `Ok(false)` at end of input.
    pub fn next_row(&mut self, row: &mut Row) -> Result<bool> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => return Ok(false),
            Ok(true) => {}
            Err(err) => return Err(self.classify(err)),
        }

        let line = self.current_line();
        if self.record.len() != self.width {
            return Err(Error::Parse {
                entry: self.entry.clone(),
                line,
                message: format!(
                    "expected {} fields, found {}",
                    self.width,
                    self.record.len()
                ),
            });
        }

        row.clear();
        row.extend(self.record.iter().map(Value::infer));
        self.rows += 1;
        Ok(true)
    }

    /// Lines handed out so far (blank lines excluded).
    pub fn rows_read(&self) -> u64 {
        self.rows
    }

    fn current_line(&self) -> u64 {
        self.record.position().map_or(0, |p| p.line())
    }

    fn classify(&self, err: csv::Error) -> Error {
        let line = err.position().map_or_else(|| self.current_line(), |p| p.line());
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => Error::from_read(io_err),
            csv::ErrorKind::Utf8 { err, .. } => Error::Parse {
                entry: self.entry.clone(),
                line,
                message: format!("invalid UTF-8: {err}"),
            },
            other => Error::Parse {
                entry: self.entry.clone(),
                line,
                message: format!("{other:?}"),
            },
        }
    }
}
