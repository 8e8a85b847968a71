//! Where archive bytes come from.
//!
//! `http(s)://` goes through a `ureq` agent; `file://` URLs and bare paths
//! read from disk. Either way the caller gets a plain blocking reader, so
//! downstream reads pace the socket.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result, TransportError};

/// Opens a URL as a byte stream.
pub trait Source {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>>;
}

/// Network settings for [`HttpSource`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Longest wait for a single socket read, not for the whole body.
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(300),
            user_agent: concat!("geoextract/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking HTTP GET via a shared `ureq` agent.
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(options: &HttpOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(options.connect_timeout)
            .timeout_read(options.read_timeout)
            .user_agent(&options.user_agent)
            .build();
        Self { agent }
    }
}

impl Source for HttpSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        debug!(url, "requesting archive");
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(Error::Network(format!(
                    "GET {url} returned {code} {}",
                    response.status_text()
                )));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::Network(format!("GET {url} failed: {transport}")));
            }
        };
        debug!(
            status = response.status(),
            content_length = response.header("content-length").unwrap_or("-"),
            "response received"
        );
        Ok(Box::new(Tagged(response.into_reader())))
    }
}

/// Reads a local archive, for `file://` URLs and bare paths.
pub struct FileSource;

impl Source for FileSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        let path = local_path(url);
        debug!(path = %path.display(), "opening local archive");
        let file = File::open(&path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// Picks the source for `url` by scheme.
pub struct AutoSource {
    http: HttpSource,
}

impl AutoSource {
    pub fn new(options: &HttpOptions) -> Self {
        Self {
            http: HttpSource::new(options),
        }
    }
}

impl Source for AutoSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        match scheme(url).map(str::to_ascii_lowercase).as_deref() {
            Some("http" | "https") => self.http.open(url),
            Some("file") | None => FileSource.open(url),
            Some(other) => Err(Error::Config(format!("unsupported URL scheme '{other}'"))),
        }
    }
}

/// Scheme of `url` as written, or `None` for a bare path.
pub fn scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'));
    valid.then_some(scheme)
}

/// Validate that `url` names something an [`AutoSource`] can open.
pub fn check_url(url: &str) -> Result<()> {
    match scheme(url).map(str::to_ascii_lowercase).as_deref() {
        None | Some("http" | "https" | "file") => Ok(()),
        Some(other) => Err(Error::Config(format!("unsupported URL scheme '{other}'"))),
    }
}

fn local_path(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
}

/// Tags every socket read failure as a transport failure so it can be told
/// apart from decompression errors further down the chain.
struct Tagged<R>(R);

impl<R: Read> Read for Tagged<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(TransportError::wrap)
    }
}
