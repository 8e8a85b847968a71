/// Per-entry row pipeline: parse, filter, project, serialize.
///
/// Every stage is a pull on the one before it. A row is read, tested,
/// projected and handed to the sink before the next line is requested, so
/// memory stays bounded by one row plus the reader and writer buffers.
use std::io::{Read, Write};

use crate::error::Result;
use crate::filter::Predicate;
use crate::input::{Row, RowReader};
use crate::output::Sink;
use crate::schema::{Projection, Schema};
use crate::value::Value;

/// The values at `indices`, in that order.
///
/// Indices come from [`Schema::resolve`], so they are always in range for a
/// row that passed the width check.
pub fn project<'a>(
    row: &'a [Value],
    indices: &'a [usize],
) -> impl ExactSizeIterator<Item = &'a Value> + 'a {
    indices.iter().map(move |&i| &row[i])
}

/// Row counts for one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub rows_read: u64,
    pub rows_written: u64,
}

/// The compiled per-entry stage, shared by every data entry of a run.
pub struct Stage<'a> {
    schema: &'a Schema,
    projection: &'a Projection,
    predicate: Option<&'a Predicate>,
}

impl<'a> Stage<'a> {
    pub fn new(
        schema: &'a Schema,
        projection: &'a Projection,
        predicate: Option<&'a Predicate>,
    ) -> Self {
        Self {
            schema,
            projection,
            predicate,
        }
    }

    /// Stream every row of `input` through to `sink`.
    ///
    /// Rows the predicate rejects produce nothing. The first parse, predicate
    /// or write error stops the entry; rows already written stay written.
    pub fn run<R: Read, W: Write>(
        &self,
        entry: &str,
        input: R,
        sink: &mut Sink<W>,
    ) -> Result<EntryStats> {
        let mut reader = RowReader::new(input, entry, self.schema.len());
        let mut row = Row::with_capacity(self.schema.len());
        let indices = self.projection.indices();
        let mut written = 0u64;

        while reader.next_row(&mut row)? {
            if let Some(predicate) = self.predicate {
                if !predicate.evaluate(&row)? {
                    continue;
                }
            }
            sink.write_row(project(&row, indices))?;
            written += 1;
        }

        Ok(EntryStats {
            rows_read: reader.rows_read(),
            rows_written: written,
        })
    }
}
