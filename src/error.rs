//! Error types for extraction runs.
//!
//! Every failure is fatal to the run. The only intentional drop in the
//! pipeline is a row whose predicate evaluates falsy, which is not an error.

use std::io;

use thiserror::Error;

/// Errors that can abort an extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested or referenced column is not part of the schema
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Connection, transport or HTTP status failure
    #[error("network error: {0}")]
    Network(String),

    /// Corrupt or unreadable archive data
    #[error("archive error: {0}")]
    Archive(String),

    /// Malformed tab-delimited line
    #[error("parse error in '{entry}' at line {line}: {message}")]
    Parse {
        entry: String,
        line: u64,
        message: String,
    },

    /// Filter expression failed to compile or to evaluate
    #[error("predicate error: {0}")]
    Predicate(String),

    /// Destination stream failure
    #[error("write error: {0}")]
    Write(String),

    /// Invalid request (no columns, unsupported URL scheme)
    #[error("invalid request: {0}")]
    Config(String),

    /// Local file could not be opened
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of [`Error`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownColumn,
    Network,
    Archive,
    Parse,
    Predicate,
    Write,
    Config,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownColumn(_) => ErrorKind::UnknownColumn,
            Error::Network(_) => ErrorKind::Network,
            Error::Archive(_) => ErrorKind::Archive,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Predicate(_) => ErrorKind::Predicate,
            Error::Write(_) => ErrorKind::Write,
            Error::Config(_) => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Classify an I/O failure raised while pulling bytes out of an archive.
    ///
    /// The source reader tags transport failures with [`TransportError`];
    /// anything else came from the decompressor or checksum check.
    pub fn from_read(err: io::Error) -> Self {
        match err.get_ref().and_then(|inner| inner.downcast_ref::<TransportError>()) {
            Some(transport) => Error::Network(transport.0.clone()),
            None => Error::Archive(err.to_string()),
        }
    }
}

/// Marker payload for I/O errors that originate in the network source.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Wrap a transport failure, keeping its `ErrorKind`.
    pub fn wrap(err: io::Error) -> io::Error {
        io::Error::new(err.kind(), TransportError(err.to_string()))
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_read_failure_is_network() {
        let err = TransportError::wrap(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        let classified = Error::from_read(err);
        assert_eq!(classified.kind(), ErrorKind::Network);
        assert!(classified.to_string().contains("connection reset"));
    }

    #[test]
    fn untagged_read_failure_is_archive() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "Invalid checksum");
        let classified = Error::from_read(err);
        assert_eq!(classified.kind(), ErrorKind::Archive);
    }

    #[test]
    fn parse_error_names_entry_and_line() {
        let err = Error::Parse {
            entry: "FR.txt".into(),
            line: 7,
            message: "expected 19 fields, found 3".into(),
        };
        assert_eq!(
            err.to_string(),
            "parse error in 'FR.txt' at line 7: expected 19 fields, found 3"
        );
    }
}
