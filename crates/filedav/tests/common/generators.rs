//! Test data generators for file server integration tests.

#![allow(dead_code)]

use rand::Rng;

/// Generate random bytes of specified size.
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..size).map(|_| rng.random()).collect()
}

/// Generate content containing all 256 possible byte values.
pub fn all_byte_values() -> Vec<u8> {
    (0u8..=255).collect()
}

/// Generate a filename with XML-special characters.
pub fn xml_special_filename() -> String {
    "a<b>&'c\".txt".to_string()
}

/// Generate binary content with patterns that might break text processing.
///
/// Includes null bytes, newlines, and control characters.
pub fn problematic_binary() -> Vec<u8> {
    let mut data = Vec::with_capacity(1024);
    data.extend_from_slice(&[0, 0, 0]);
    data.extend_from_slice(b"\n\r\n\r");
    data.extend(0u8..32);
    data.extend(128u8..=255);
    data.extend_from_slice(b"normal text here");
    data.extend_from_slice(&[0, 0, 0]);
    data
}
