//! Library-backed WebDAV variant.
//!
//! All protocol work (PROPFIND, PROPPATCH, LOCK/UNLOCK, MKCOL, COPY, MOVE,
//! multistatus XML) is delegated to `dav-server`. This module only binds the
//! handler to a local directory and an in-memory lock system and mounts it
//! under [`DAV_PREFIX`].

use bytes::Bytes;
use dav_server::localfs::LocalFs;
use dav_server::memls::MemLs;
use dav_server::DavHandler;
use hyper::body::Body;
use hyper::{Request, Response};
use std::error::Error as StdError;
use std::path::Path;
use tracing::debug;

/// Path prefix the WebDAV handler is mounted under.
pub const DAV_PREFIX: &str = "/dav";

/// Build a WebDAV handler serving `root`.
///
/// Locks are held in memory only and vanish with the process.
pub fn build_dav_handler(root: &Path) -> DavHandler {
    DavHandler::builder()
        .strip_prefix(DAV_PREFIX)
        .filesystem(LocalFs::new(root, false, false, false))
        .locksystem(MemLs::new())
        .build_handler()
}

/// Whether a request path falls under the mount prefix.
pub fn is_mounted(path: &str) -> bool {
    path.strip_prefix(DAV_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Hand a mounted request to the WebDAV handler.
pub async fn handle<B>(handler: &DavHandler, req: Request<B>) -> Response<dav_server::body::Body>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: StdError + Send + Sync + 'static,
{
    debug!(method = %req.method(), path = %req.uri().path(), "WebDAV request");
    handler.handle(req).await
}
