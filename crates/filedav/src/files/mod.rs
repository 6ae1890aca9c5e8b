//! Hand-rolled file server.
//!
//! A single catch-all service that dispatches by request method to one of
//! five leaf operations over a local directory:
//!
//! | Method   | Operation                         | Success |
//! |----------|-----------------------------------|---------|
//! | GET      | read the file (conditional)       | 200/304 |
//! | PUT      | create/truncate and write the file| 201     |
//! | DELETE   | remove the file                   | 204     |
//! | OPTIONS  | static capability headers         | 200     |
//! | PROPFIND | depth-0 properties as XML         | 200     |
//!
//! Every other method is answered with 405.

mod content_type;
mod handlers;
mod path;
mod propfind;

pub use content_type::{content_type_for, DEFAULT_CONTENT_TYPE};
pub use handlers::{ALLOW_HEADER_VALUE, CONTENT_TYPE_XML, DAV_HEADER_VALUE, DISPATCHED_METHODS};
pub use path::{resolve, ResolvedPath};
pub use propfind::{render_multistatus, PropEntry};

use crate::error::FileDavError;
use bytes::Bytes;
use handlers::text_response;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Method, Request, Response};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Method dispatcher over a storage root.
#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
}

impl FileService {
    /// Create a service serving files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Handle one request.
    ///
    /// Never fails: errors are reported to the client as a status code with a
    /// short plain-text message.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!(method = %method, path = %path, "Dispatching request");

        let result = match method.as_str() {
            "GET" => self.handle_get(&path, req.headers()).await,
            "PUT" => self.handle_put(&path, req.into_body()).await,
            "DELETE" => self.handle_delete(&path).await,
            "OPTIONS" => Ok(Self::handle_options()),
            "PROPFIND" => self.handle_propfind(&path).await,
            _ => Ok(Self::handle_unsupported()),
        };

        result.unwrap_or_else(|e| error_response(&method, &path, &e))
    }
}

fn error_response(method: &Method, path: &str, err: &FileDavError) -> Response<Full<Bytes>> {
    let status = if method == Method::PUT {
        err.write_status()
    } else {
        err.status()
    };

    if status.is_server_error() {
        warn!(method = %method, path = %path, status = %status, error = %err, "Request failed");
    } else {
        debug!(method = %method, path = %path, status = %status, error = %err, "Request rejected");
    }

    text_response(status, err.client_message())
}
