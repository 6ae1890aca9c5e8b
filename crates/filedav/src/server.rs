//! HTTP server lifecycle management.
//!
//! This module owns the listener, the per-connection tasks and the
//! start/stop lifecycle for both server modes.

use crate::dav::{self, build_dav_handler};
use crate::files::FileService;
use bytes::Bytes;
use dav_server::DavHandler;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::convert::Infallible;
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Port both daemons listen on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8080;

/// Which of the two daemons to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    /// `dav-server` handler mounted under `/dav/`.
    Dav,
    /// Hand-rolled five-verb file server at the server root.
    Files,
}

impl ServerMode {
    /// Storage directory used when none is configured.
    pub fn default_root(self) -> &'static str {
        match self {
            ServerMode::Dav => "./webdav",
            ServerMode::Files => "./uploads",
        }
    }

    /// Path prefix clients should use.
    pub fn mount_path(self) -> &'static str {
        match self {
            ServerMode::Dav => "/dav/",
            ServerMode::Files => "/",
        }
    }
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMode::Dav => f.write_str("dav"),
            ServerMode::Files => f.write_str("files"),
        }
    }
}

/// Configuration for a file server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server mode.
    pub mode: ServerMode,
    /// Storage directory, created at startup if missing.
    pub root: PathBuf,
    /// Bind address.
    pub bind_address: IpAddr,
    /// Port to bind to (0 = auto-assign).
    pub port: u16,
}

impl ServerConfig {
    /// Configuration with the mode's default root on `0.0.0.0:8080`.
    pub fn new(mode: ServerMode) -> Self {
        Self {
            mode,
            root: PathBuf::from(mode.default_root()),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }

    /// Set the storage directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the bind address.
    #[must_use]
    pub fn with_bind_address(mut self, addr: IpAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Response body shared by both modes.
type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Per-mode request router.
#[derive(Clone)]
enum Router {
    Dav(Arc<DavHandler>),
    Files(Arc<FileService>),
}

impl Router {
    fn new(config: &ServerConfig) -> Self {
        match config.mode {
            ServerMode::Dav => Router::Dav(Arc::new(build_dav_handler(&config.root))),
            ServerMode::Files => Router::Files(Arc::new(FileService::new(config.root.clone()))),
        }
    }

    async fn route(&self, req: Request<Incoming>) -> Response<ResponseBody> {
        match self {
            Router::Dav(handler) => {
                if dav::is_mounted(req.uri().path()) {
                    dav::handle(handler, req)
                        .await
                        .map(|body| body.map_err(io::Error::other).boxed_unsync())
                } else {
                    debug!(path = %req.uri().path(), "Request outside WebDAV mount");
                    let mut resp = Response::new(Full::new(Bytes::from_static(b"Not found")));
                    *resp.status_mut() = StatusCode::NOT_FOUND;
                    resp.map(full_body)
                }
            }
            Router::Files(service) => service.handle(req).await.map(full_body),
        }
    }
}

fn full_body(body: Full<Bytes>) -> ResponseBody {
    body.map_err(|never: Infallible| match never {}).boxed_unsync()
}

/// A running file server instance.
pub struct FileServer {
    /// The actual bound address.
    pub addr: SocketAddr,
    /// Mode the server runs in.
    mode: ServerMode,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Server task handle.
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl FileServer {
    /// Ensure the storage directory exists, bind, and start serving.
    pub async fn start(config: ServerConfig) -> Result<Self, io::Error> {
        tokio::fs::create_dir_all(&config.root).await?;

        let addr = SocketAddr::new(config.bind_address, config.port);
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        info!(
            addr = %actual_addr,
            mode = %config.mode,
            root = %config.root.display(),
            "Starting file server"
        );

        let router = Router::new(&config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            tokio::select! {
                () = run_server(listener, router) => {
                    debug!("Server loop ended");
                }
                _ = shutdown_rx => {
                    info!("Received shutdown signal");
                }
            }
        });

        Ok(Self {
            addr: actual_addr,
            mode: config.mode,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// Base URL of this server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL clients should point at (includes the `/dav/` prefix in dav mode).
    pub fn mount_url(&self) -> String {
        format!("{}{}", self.url(), self.mode.mount_path())
    }

    /// Stop the server.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
        info!("File server stopped");
    }

    /// Stop the server synchronously (for use in Drop).
    fn stop_sync(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

/// Run the server accept loop.
async fn run_server(listener: TcpListener, router: Router) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let router = router.clone();
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = service_fn(move |req: Request<Incoming>| {
                        let router = router.clone();
                        async move { Ok::<_, Infallible>(router.route(req).await) }
                    });

                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await
                    {
                        warn!(peer = %peer_addr, error = %e, "HTTP connection error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}
