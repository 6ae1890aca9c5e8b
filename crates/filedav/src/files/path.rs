//! Mapping of request paths onto the storage root.

use crate::error::{FileDavError, FileDavResult};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A request path resolved under the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute (root-joined) filesystem path.
    pub fs_path: PathBuf,
    /// Last decoded path segment, empty for the root itself.
    pub name: String,
}

/// Resolve a raw URL path under `root`.
///
/// The path is percent-decoded and split into segments. Empty and `.`
/// segments are dropped; a `..` segment is rejected so that no request can
/// name a file outside the root.
pub fn resolve(root: &Path, url_path: &str) -> FileDavResult<ResolvedPath> {
    let decoded = urlencoding::decode(url_path)
        .map_err(|_| FileDavError::InvalidPath(url_path.to_string()))?;

    let mut fs_path = root.to_path_buf();
    let mut name = String::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(FileDavError::InvalidPath(url_path.to_string())),
            s if s.contains('\0') || s.contains('\\') => {
                return Err(FileDavError::InvalidPath(url_path.to_string()));
            }
            s => {
                fs_path.push(s);
                name = s.to_string();
            }
        }
    }

    trace!(raw_path = %url_path, resolved = %fs_path.display(), "resolve");
    Ok(ResolvedPath { fs_path, name })
}
