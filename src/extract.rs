//! End-to-end extraction: source → archive → per-entry stage → CSV file.
//!
//! Everything that can be validated without I/O is validated first:
//! columns, filter and URL scheme are all checked before the destination is
//! created or the source is opened.

use std::fs::File;
use std::path::PathBuf;

use tracing::info;

use crate::archive;
use crate::error::{Error, Result};
use crate::filter::Predicate;
use crate::output::Sink;
use crate::pipeline::Stage;
use crate::schema::Schema;
use crate::source::{self, AutoSource, HttpOptions, Source};

/// What to extract and where to put it.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    /// `http(s)://` URL, `file://` URL or local path of the zip archive.
    pub url: String,
    pub destination: PathBuf,
    /// Output columns, in output order.
    pub columns: Vec<String>,
    /// Row filter; blank is the same as none.
    pub filter: Option<String>,
}

/// How to fetch.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub http: HttpOptions,
}

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Data entries processed.
    pub entries: usize,
    /// Readme and directory entries drained unparsed.
    pub skipped: usize,
    pub rows_read: u64,
    pub rows_written: u64,
}

/// Run one extraction against the GeoNames schema.
pub fn extract(request: &ExtractRequest, options: &ExtractOptions) -> Result<Summary> {
    let source = AutoSource::new(&options.http);
    extract_with(&source, &Schema::geonames(), request)
}

/// Run one extraction reading the archive through `source`.
///
/// On failure the destination keeps whatever was written before the error.
pub fn extract_with<S: Source + ?Sized>(
    source: &S,
    schema: &Schema,
    request: &ExtractRequest,
) -> Result<Summary> {
    let projection = schema.resolve(&request.columns)?;
    let predicate = request
        .filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| Predicate::compile(f, schema))
        .transpose()?;
    source::check_url(&request.url)?;

    let file = File::create(&request.destination).map_err(|source| Error::Io {
        path: request.destination.display().to_string(),
        source,
    })?;
    let mut sink = Sink::new(file);
    sink.write_header(projection.names())?;

    let input = source.open(&request.url)?;
    let stage = Stage::new(schema, &projection, predicate.as_ref());
    let mut rows_read = 0;

    let stats = archive::for_each_entry(input, |entry, reader| {
        let counts = stage.run(entry, reader, &mut sink)?;
        info!(
            entry,
            rows_read = counts.rows_read,
            rows_written = counts.rows_written,
            "entry processed"
        );
        rows_read += counts.rows_read;
        Ok(())
    })?;

    let summary = Summary {
        entries: stats.data,
        skipped: stats.skipped,
        rows_read,
        rows_written: sink.rows_written(),
    };
    sink.finish()?;

    info!(
        entries = summary.entries,
        skipped = summary.skipped,
        rows_read = summary.rows_read,
        rows_written = summary.rows_written,
        "processing complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::cell::Cell;
    use std::io::{Cursor, Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Serves a fixed archive and records whether it was asked to.
    struct MemorySource {
        bytes: Vec<u8>,
        opened: Cell<bool>,
    }

    impl MemorySource {
        fn new(entries: &[(&str, &str)]) -> Self {
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            for (name, data) in entries {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
            Self {
                bytes: zip.finish().unwrap().into_inner(),
                opened: Cell::new(false),
            }
        }
    }

    impl Source for MemorySource {
        fn open(&self, _url: &str) -> Result<Box<dyn Read + Send>> {
            self.opened.set(true);
            Ok(Box::new(Cursor::new(self.bytes.clone())))
        }
    }

    const ROWS: &str = "1\tParis\tParis\t\t48.85341\t2.3488\tP\tPPLC\tFR\t\t11\t75\t751\t75056\t2138551\t\t42\tEurope/Paris\t2023-10-04\n\
                        2\tLyon\tLyon\t\t45.74846\t4.84671\tP\tPPLA\tFR\t\t84\t69\t691\t69123\t522228\t\t171\tEurope/Paris\t2024-01-05\n";

    fn request(dir: &tempfile::TempDir, columns: &[&str], filter: Option<&str>) -> ExtractRequest {
        ExtractRequest {
            url: "https://example.invalid/FR.zip".into(),
            destination: dir.path().join("out.csv"),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            filter: filter.map(str::to_string),
        }
    }

    #[test]
    fn extracts_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("readme.txt", "not data"), ("FR.txt", ROWS)]);
        let req = request(&dir, &["id", "name"], Some("population > 1000000"));

        let summary = extract_with(&source, &Schema::geonames(), &req).unwrap();
        assert_eq!(
            summary,
            Summary {
                entries: 1,
                skipped: 1,
                rows_read: 2,
                rows_written: 1
            }
        );
        let out = std::fs::read_to_string(&req.destination).unwrap();
        assert_eq!(out, "id,name\n1,Paris\n");
    }

    #[test]
    fn unknown_column_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("FR.txt", ROWS)]);
        let req = request(&dir, &["id", "altitude"], None);

        let err = extract_with(&source, &Schema::geonames(), &req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownColumn);
        assert!(!source.opened.get());
        assert!(!req.destination.exists());
    }

    #[test]
    fn bad_filter_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("FR.txt", ROWS)]);
        let req = request(&dir, &["id"], Some("altitude > 3"));

        let err = extract_with(&source, &Schema::geonames(), &req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Predicate);
        assert!(!source.opened.get());
        assert!(!req.destination.exists());
    }

    #[test]
    fn blank_filter_keeps_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("FR.txt", ROWS)]);
        let req = request(&dir, &["name"], Some("   "));

        let summary = extract_with(&source, &Schema::geonames(), &req).unwrap();
        assert_eq!(summary.rows_written, 2);
    }

    #[test]
    fn unsupported_scheme_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("FR.txt", ROWS)]);
        let mut req = request(&dir, &["id"], None);
        req.url = "ftp://example.invalid/FR.zip".into();

        let err = extract_with(&source, &Schema::geonames(), &req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(!req.destination.exists());
    }

    #[test]
    fn entries_are_concatenated_in_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let (first, second) = ROWS.split_at(ROWS.find('\n').unwrap() + 1);
        let source = MemorySource::new(&[("b.txt", second), ("a.txt", first)]);
        let req = request(&dir, &["name"], None);

        let summary = extract_with(&source, &Schema::geonames(), &req).unwrap();
        assert_eq!(summary.entries, 2);
        let out = std::fs::read_to_string(&req.destination).unwrap();
        assert_eq!(out, "name\nLyon\nParis\n");
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(&[("FR.txt", ROWS)]);
        let mut req = request(&dir, &["id"], None);
        req.destination = dir.path().join("missing").join("out.csv");

        let err = extract_with(&source, &Schema::geonames(), &req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!source.opened.get());
    }
}
