//! Shared fixtures for the integration tests: GeoNames-shaped lines, zip
//! archives built in memory, and a throwaway `tiny_http` server.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;

use tiny_http::{Header, Response, Server, StatusCode};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One 19-field `geoname` line with the interesting columns filled in.
pub fn geo_line(id: u64, name: &str, feature_class: &str, population: u64, dem: i64) -> String {
    let fields: [String; 19] = [
        id.to_string(),
        name.to_string(),
        name.to_string(),
        String::new(),
        "48.85341".to_string(),
        "2.3488".to_string(),
        feature_class.to_string(),
        "PPL".to_string(),
        "FR".to_string(),
        String::new(),
        "11".to_string(),
        "75".to_string(),
        String::new(),
        String::new(),
        population.to_string(),
        String::new(),
        dem.to_string(),
        "Europe/Paris".to_string(),
        "2024-01-05".to_string(),
    ];
    let mut line = fields.join("\t");
    line.push('\n');
    line
}

/// Zip archive holding `entries` in order. Names ending in `/` become
/// directory entries.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        if let Some(dir) = name.strip_suffix('/') {
            zip.add_directory(dir, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Same as [`zip_archive`] but with every entry stored uncompressed.
pub fn stored_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn write_archive(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("archive.zip");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Serve `body` with `status` to every request on a local port and return
/// the URL. The server thread is left running until the test exits.
pub fn serve(status: u16, body: Vec<u8>) -> String {
    let declared = body.len();
    serve_raw(status, body, declared)
}

/// Like [`serve`], but announce `declared` bytes while sending only `body`.
pub fn serve_raw(status: u16, body: Vec<u8>, declared: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/zip"[..]).unwrap();
            let response = Response::new(
                StatusCode(status),
                vec![content_type],
                Cursor::new(body.clone()),
                Some(declared),
                None,
            );
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}/export/dump/FR.zip")
}

/// A URL on a port nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/FR.zip")
}
