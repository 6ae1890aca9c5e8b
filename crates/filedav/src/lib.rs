//! Minimal file-serving HTTP daemons over a local directory.
//!
//! This crate provides two server modes sharing one listener and lifecycle:
//!
//! - **dav**: a `dav-server` handler bound to the storage directory with an
//!   in-memory lock system, mounted under `/dav/`. All WebDAV protocol logic
//!   is delegated to the library.
//! - **files**: a hand-rolled dispatcher for GET, PUT, DELETE, OPTIONS and
//!   PROPFIND, each mapped to a single filesystem call.
//!
//! # Example
//!
//! ```ignore
//! use filedav::{FileServer, ServerConfig, ServerMode};
//!
//! let config = ServerConfig::new(ServerMode::Files).with_root("./uploads");
//! let server = FileServer::start(config).await?;
//! println!("Serving on {}", server.mount_url());
//! // ...
//! server.stop().await;
//! ```
//!
//! # Security
//!
//! There is no authentication. Request paths are confined to the storage
//! root: any `..` segment is rejected before touching the filesystem.

pub mod dav;
mod error;
pub mod files;
mod server;

// Public exports
pub use error::{io_error_to_status, FileDavError, FileDavResult};
pub use files::FileService;
pub use server::{FileServer, ServerConfig, ServerMode, DEFAULT_PORT};
