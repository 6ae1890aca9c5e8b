//! Test server harness for file server integration tests.
//!
//! Provides a `TestServer` that runs either server mode over a temporary
//! storage directory, along with HTTP convenience methods.

#![allow(dead_code)]

use bytes::Bytes;
use filedav::{FileServer, ServerConfig, ServerMode};
use reqwest::{Client, Method, Response, StatusCode};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Test server with HTTP client and automatic cleanup.
pub struct TestServer {
    /// The running server.
    server: FileServer,
    /// HTTP client for making requests.
    client: Client,
    /// Base URL for request paths (includes `/dav` in dav mode).
    pub base_url: String,
    /// Storage directory (cleaned up on drop).
    temp_dir: TempDir,
}

impl TestServer {
    /// Start the hand-rolled file server over a fresh temporary directory.
    pub async fn files() -> Self {
        Self::start(ServerMode::Files).await
    }

    /// Start the library-backed WebDAV server over a fresh temporary directory.
    pub async fn dav() -> Self {
        Self::start(ServerMode::Dav).await
    }

    async fn start(mode: ServerMode) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = ServerConfig::new(mode)
            .with_root(temp_dir.path().join("storage"))
            .with_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(0);
        let server = FileServer::start(config)
            .await
            .expect("Failed to start file server");

        let base_url = match mode {
            ServerMode::Dav => format!("{}/dav", server.url()),
            ServerMode::Files => server.url(),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let test_server = Self {
            server,
            client,
            base_url,
            temp_dir,
        };

        test_server.wait_ready().await;

        test_server
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_ready(&self) {
        for _ in 0..50 {
            if let Ok(resp) = self.options("/").await {
                if resp.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready in time");
    }

    /// Storage directory on disk.
    pub fn root(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("storage")
    }

    /// Path of a stored file on disk.
    pub fn disk_path(&self, rel: &str) -> std::path::PathBuf {
        self.root().join(Path::new(rel.trim_start_matches('/')))
    }

    /// Server origin without any mount prefix.
    pub fn origin(&self) -> String {
        self.server.url()
    }

    /// Build a full URL from a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========== HTTP Convenience Methods ==========

    /// Send a request with an arbitrary method and no body.
    pub async fn request(&self, method: &str, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(method.as_bytes()).unwrap(), self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("{method} request failed: {e}"))
    }

    /// GET a file's contents.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET with one extra request header.
    pub async fn get_with(&self, path: &str, name: &str, value: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(name, value)
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET a file's contents as bytes.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, (StatusCode, String)> {
        let resp = self.get(path).await;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await.expect("Failed to read response bytes"))
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err((status, body))
        }
    }

    /// PUT file contents.
    pub async fn put(&self, path: &str, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .put(self.url(path))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// PUT file contents and assert success.
    pub async fn put_ok(&self, path: &str, body: impl Into<reqwest::Body>) {
        let resp = self.put(path, body).await;
        let status = resp.status();
        assert!(
            status == StatusCode::CREATED || status == StatusCode::NO_CONTENT,
            "PUT {} failed with status {}: {}",
            path,
            status,
            resp.text().await.unwrap_or_default()
        );
    }

    /// DELETE a file.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// DELETE and assert success.
    pub async fn delete_ok(&self, path: &str) {
        let resp = self.delete(path).await;
        let status = resp.status();
        assert_eq!(
            status,
            StatusCode::NO_CONTENT,
            "DELETE {} failed with status {}",
            path,
            status
        );
    }

    /// OPTIONS capability probe.
    pub async fn options(&self, path: &str) -> reqwest::Result<Response> {
        self.client
            .request(Method::OPTIONS, self.url(path))
            .send()
            .await
    }

    /// PROPFIND (get properties).
    pub async fn propfind(&self, path: &str, depth: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .header("Depth", depth)
            .send()
            .await
            .expect("PROPFIND request failed")
    }

    /// PROPFIND and return body as string.
    pub async fn propfind_body(&self, path: &str, depth: &str) -> (StatusCode, String) {
        let resp = self.propfind(path, depth).await;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (status, body)
    }

    /// MKCOL (create directory, dav mode only).
    pub async fn mkcol(&self, path: &str) -> Response {
        self.request("MKCOL", path).await
    }

    /// Stop the server explicitly (otherwise happens on drop).
    pub async fn stop(self) {
        self.server.stop().await;
    }
}
