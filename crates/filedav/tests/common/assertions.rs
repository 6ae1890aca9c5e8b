//! Custom assertions for file server integration tests.

#![allow(dead_code)]

use crate::common::TestServer;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};

/// Assert that a file exists and has the expected content.
pub async fn assert_file_content(server: &TestServer, path: &str, expected: &[u8]) {
    match server.get_bytes(path).await {
        Ok(actual) => {
            assert_eq!(
                actual.as_ref(),
                expected,
                "File content mismatch at {}: expected {} bytes, got {} bytes",
                path,
                expected.len(),
                actual.len()
            );
        }
        Err((status, body)) => {
            panic!("Failed to read file {path}: status={status}, body={body}");
        }
    }
}

/// Assert that a path returns 404 Not Found.
pub async fn assert_not_found(server: &TestServer, path: &str) {
    let resp = server.get(path).await;
    assert_eq!(
        resp.status(),
        StatusCode::NOT_FOUND,
        "Expected 404 for {}, got {}",
        path,
        resp.status()
    );
}

/// Assert that a response has a specific status code.
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

/// Assert that a document parses as XML from start to end.
pub fn assert_well_formed_xml(xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("Malformed XML: {e}\n{xml}"),
        }
    }
}

/// Raw (still escaped) inner text of the first `<D:{name}>` element.
pub fn prop_text(xml: &str, name: &str) -> Option<String> {
    let open = format!("<D:{name}>");
    let close = format!("</D:{name}>");
    let start = xml.find(&open)? + open.len();
    let len = xml[start..].find(&close)?;
    Some(xml[start..start + len].to_string())
}

/// Calculate SHA-256 hash of data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
