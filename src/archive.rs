//! Streaming demultiplexer for zip archives.
//!
//! Entries are read in archive order straight from local file headers, so
//! the archive never has to be seekable or held in memory. Each entry is
//! either routed to a visitor or drained into nothing.

use std::io::{self, BufRead, BufReader, Read};

use tracing::debug;
use zip::read::read_zipfile_from_stream;
use zip::result::ZipError;

use crate::error::{Error, Result};

/// Name fragment (lower case) that marks documentation entries.
const SKIP_PATTERN: &str = "readme";

/// End-of-central-directory signature, present first in an empty archive.
const EMPTY_ARCHIVE_SIGNATURE: &[u8; 4] = b"PK\x05\x06";

/// How an entry is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Parsed as tab-delimited rows.
    Data,
    /// Drained unparsed: directories and readme-like files.
    Skip,
}

/// Classify an entry by name. Matching is a case-insensitive substring test.
pub fn classify(name: &str, is_dir: bool) -> EntryKind {
    if is_dir || name.to_ascii_lowercase().contains(SKIP_PATTERN) {
        EntryKind::Skip
    } else {
        EntryKind::Data
    }
}

/// Per-archive entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub data: usize,
    pub skipped: usize,
}

/// Walk every entry of the archive in `input`, in order.
///
/// `visit` receives each data entry's name and decompressed bytes. Whatever
/// it leaves unread is drained before the next entry. Skip entries never
/// reach `visit`. The first error from the archive or from `visit` stops
/// the walk.
pub fn for_each_entry<R, F>(input: R, mut visit: F) -> Result<ArchiveStats>
where
    R: Read,
    F: FnMut(&str, &mut dyn Read) -> Result<()>,
{
    let mut input = BufReader::new(input);
    let mut stats = ArchiveStats::default();

    if is_empty_archive(&mut input).map_err(Error::from_read)? {
        debug!("archive has no entries");
        return Ok(stats);
    }

    loop {
        let mut entry = match read_zipfile_from_stream(&mut input) {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => return Err(zip_error(err)),
        };
        let name = entry.name().to_string();

        match classify(&name, entry.is_dir()) {
            EntryKind::Skip => {
                debug!(entry = %name, "skipping entry");
                stats.skipped += 1;
            }
            EntryKind::Data => {
                debug!(entry = %name, size = entry.size(), "reading entry");
                visit(&name, &mut entry)?;
                stats.data += 1;
            }
        }
        io::copy(&mut entry, &mut io::sink()).map_err(Error::from_read)?;
    }

    Ok(stats)
}

fn is_empty_archive<R: Read>(input: &mut BufReader<R>) -> io::Result<bool> {
    let head = input.fill_buf()?;
    Ok(head.starts_with(EMPTY_ARCHIVE_SIGNATURE))
}

fn zip_error(err: ZipError) -> Error {
    match err {
        ZipError::Io(io_err) => Error::from_read(io_err),
        other => Error::Archive(other.to_string()),
    }
}
