//! Leaf operations of the hand-rolled file server.
//!
//! Each handler performs one filesystem call and builds one response.
//! Errors bubble up as [`FileDavError`] and are turned into a status code by
//! the dispatcher.

use super::content_type::content_type_for;
use super::path::resolve;
use super::propfind::{render_multistatus, PropEntry};
use super::FileService;
use crate::error::{FileDavError, FileDavResult};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{
    HeaderMap, HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE,
    IF_NONE_MATCH, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Value of the `DAV` header returned by OPTIONS.
pub const DAV_HEADER_VALUE: &str = "1, 2";

/// Value of the `Allow` header returned by OPTIONS.
pub const ALLOW_HEADER_VALUE: &str = "GET, HEAD, PUT, DELETE, OPTIONS, PROPFIND";

/// Methods that are actually dispatched.
pub const DISPATCHED_METHODS: &str = "GET, PUT, DELETE, OPTIONS, PROPFIND";

/// Content type of PROPFIND responses.
pub const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";

const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

fn with_status(status: StatusCode, body: Full<Bytes>) -> Response<Full<Bytes>> {
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp
}

/// Response with a status and no body.
pub(crate) fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    with_status(status, Full::default())
}

/// Plain-text response with a short message.
pub(crate) fn text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut resp = with_status(status, Full::new(Bytes::from_static(message.as_bytes())));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT));
    resp
}

/// Strong validator built from size and modification time.
pub(crate) fn etag_for(len: u64, modified: Option<SystemTime>) -> String {
    let secs = modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());
    format!("\"{len}-{secs}\"")
}

/// Whether the request's validators still match the stored file.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent. Dates compare at whole-second resolution.
pub(crate) fn is_not_modified(
    headers: &HeaderMap,
    etag: &str,
    modified: Option<SystemTime>,
) -> bool {
    if let Some(value) = headers.get(IF_NONE_MATCH) {
        let Ok(value) = value.to_str() else {
            return false;
        };
        return value.split(',').map(str::trim).any(|tag| {
            tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag
        });
    }

    let Some(since) = headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
    else {
        return false;
    };
    let Some(modified) = modified else {
        return false;
    };
    // Last-Modified is sent with second precision
    match httpdate::parse_http_date(&httpdate::fmt_http_date(modified)) {
        Ok(truncated) => truncated <= since,
        Err(_) => false,
    }
}

impl FileService {
    /// GET - serve the full file contents, or 304 when the client copy is current.
    #[instrument(level = "debug", skip(self, headers))]
    pub(super) async fn handle_get(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> FileDavResult<Response<Full<Bytes>>> {
        let resolved = resolve(&self.root, path)?;
        let meta = fs::metadata(&resolved.fs_path).await?;
        if meta.is_dir() {
            debug!(path = %path, "Refusing to list directory");
            return Ok(text_response(
                StatusCode::FORBIDDEN,
                "Directory listing not supported",
            ));
        }

        let modified = meta.modified().ok();
        let etag = etag_for(meta.len(), modified);
        let last_modified = modified.map(httpdate::fmt_http_date);

        let mut resp = if is_not_modified(headers, &etag, modified) {
            debug!(path = %path, etag = %etag, "Client copy is current");
            empty_response(StatusCode::NOT_MODIFIED)
        } else {
            let contents = fs::read(&resolved.fs_path).await?;
            let len = contents.len() as u64;
            debug!(path = %path, size = len, "Serving file");

            let mut resp = with_status(StatusCode::OK, Full::new(Bytes::from(contents)));
            let headers = resp.headers_mut();
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(&resolved.fs_path)),
            );
            headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
            resp
        };

        let headers = resp.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&etag) {
            headers.insert(ETAG, value);
        }
        if let Some(value) = last_modified.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.insert(LAST_MODIFIED, value);
        }
        Ok(resp)
    }

    /// PUT - create or truncate the file and copy the request body into it.
    ///
    /// The body is written frame by frame. A failure halfway leaves a
    /// truncated file behind.
    #[instrument(level = "debug", skip(self, body))]
    pub(super) async fn handle_put<B>(
        &self,
        path: &str,
        mut body: B,
    ) -> FileDavResult<Response<Full<Bytes>>>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: Display,
    {
        let resolved = resolve(&self.root, path)?;
        let mut file = fs::File::create(&resolved.fs_path).await?;

        let mut written: u64 = 0;
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|e| FileDavError::Body(e.to_string()))?;
            if let Ok(data) = frame.into_data() {
                file.write_all(&data).await?;
                written += data.len() as u64;
            }
        }
        file.flush().await?;

        debug!(path = %path, size = written, "Stored file");
        Ok(empty_response(StatusCode::CREATED))
    }

    /// DELETE - remove the file.
    #[instrument(level = "debug", skip(self))]
    pub(super) async fn handle_delete(&self, path: &str) -> FileDavResult<Response<Full<Bytes>>> {
        let resolved = resolve(&self.root, path)?;
        fs::remove_file(&resolved.fs_path).await?;
        debug!(path = %path, "Removed file");
        Ok(empty_response(StatusCode::NO_CONTENT))
    }

    /// OPTIONS - static capability headers, whether or not the target exists.
    pub(super) fn handle_options() -> Response<Full<Bytes>> {
        let mut resp = empty_response(StatusCode::OK);
        let headers = resp.headers_mut();
        headers.insert("DAV", HeaderValue::from_static(DAV_HEADER_VALUE));
        headers.insert(ALLOW, HeaderValue::from_static(ALLOW_HEADER_VALUE));
        resp
    }

    /// PROPFIND - depth-0 properties of a single resource.
    #[instrument(level = "debug", skip(self))]
    pub(super) async fn handle_propfind(
        &self,
        path: &str,
    ) -> FileDavResult<Response<Full<Bytes>>> {
        let resolved = resolve(&self.root, path)?;
        let meta = fs::metadata(&resolved.fs_path).await?;

        let entry = if meta.is_dir() {
            PropEntry {
                href: path,
                display_name: &resolved.name,
                content_type: None,
                content_length: None,
                is_collection: true,
            }
        } else {
            PropEntry {
                href: path,
                display_name: &resolved.name,
                content_type: Some(content_type_for(&resolved.fs_path)),
                content_length: Some(meta.len()),
                is_collection: false,
            }
        };
        let xml = render_multistatus(&entry)?;

        let mut resp = with_status(StatusCode::OK, Full::new(Bytes::from(xml)));
        resp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_XML));
        Ok(resp)
    }

    /// Any other method.
    pub(super) fn handle_unsupported() -> Response<Full<Bytes>> {
        let mut resp = empty_response(StatusCode::METHOD_NOT_ALLOWED);
        resp.headers_mut()
            .insert(ALLOW, HeaderValue::from_static(DISPATCHED_METHODS));
        resp
    }
}
