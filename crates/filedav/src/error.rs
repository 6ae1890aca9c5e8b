//! Error handling and HTTP status mapping for the file server.
//!
//! Every failure inside a request handler is converted into a
//! [`FileDavError`] at the handler boundary and reported once to the client
//! through [`FileDavError::status`]. Filesystem errors keep their OS error
//! category so that not-found, permission and conflict cases stay
//! distinguishable on the wire.

use hyper::StatusCode;
use std::io;
use thiserror::Error;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum FileDavError {
    /// IO error from the underlying filesystem.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The request path could not be mapped under the root directory.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Reading the request body failed.
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// Building the PROPFIND document failed.
    #[error("Failed to write XML: {0}")]
    Xml(String),
}

impl FileDavError {
    /// HTTP status reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            FileDavError::Io(e) => io_error_to_status(e),
            FileDavError::InvalidPath(_) | FileDavError::Body(_) => StatusCode::BAD_REQUEST,
            FileDavError::Xml(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status for an error raised while creating or writing a file.
    ///
    /// A missing parent directory or a directory in the way is a conflict
    /// with the current state of the tree rather than a missing resource.
    pub fn write_status(&self) -> StatusCode {
        match self {
            FileDavError::Io(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound
                        | io::ErrorKind::IsADirectory
                        | io::ErrorKind::NotADirectory
                ) =>
            {
                StatusCode::CONFLICT
            }
            _ => self.status(),
        }
    }

    /// Short client-facing message. Internal details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            FileDavError::Io(e) => match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => "Not found",
                io::ErrorKind::PermissionDenied => "Permission denied",
                io::ErrorKind::AlreadyExists => "Already exists",
                io::ErrorKind::IsADirectory => "Conflicts with a directory",
                _ => "Internal server error",
            },
            FileDavError::InvalidPath(_) => "Invalid path",
            FileDavError::Body(_) => "Failed to read request body",
            FileDavError::Xml(_) => "Internal server error",
        }
    }
}

/// Converts an IO error kind to the HTTP status it is reported as.
pub fn io_error_to_status(e: &io::Error) -> StatusCode {
    match e.kind() {
        // A path running through a regular file names nothing.
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => StatusCode::NOT_FOUND,
        io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        io::ErrorKind::AlreadyExists
        | io::ErrorKind::IsADirectory
        | io::ErrorKind::DirectoryNotEmpty => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Result type for file server operations.
pub type FileDavResult<T> = Result<T, FileDavError>;
