//! Serve commands - run one of the two file servers until interrupted.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{info, instrument};

use filedav::{FileServer, ServerConfig, ServerMode};

use crate::config::ServerSection;

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Args {
    /// Storage directory (created if missing)
    #[arg(long, env = "FILEDAV_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, env = "FILEDAV_PORT")]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "FILEDAV_BIND", value_name = "ADDR")]
    pub bind: Option<IpAddr>,
}

/// Merge flags over the config file section over the mode defaults.
pub fn server_config(mode: ServerMode, args: &Args, section: &ServerSection) -> ServerConfig {
    let mut config = ServerConfig::new(mode);
    if let Some(root) = args.root.clone().or_else(|| section.root.clone()) {
        config = config.with_root(root);
    }
    if let Some(port) = args.port.or(section.port) {
        config = config.with_port(port);
    }
    if let Some(bind) = args.bind.or(section.bind) {
        config = config.with_bind_address(bind);
    }
    config
}

#[instrument(level = "info", name = "cmd::serve", skip_all, fields(mode = %config.mode))]
pub fn execute(config: ServerConfig) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let root = config.root.clone();
        let server = FileServer::start(config)
            .await
            .with_context(|| format!("Failed to start file server (root: {})", root.display()))?;

        info!(url = %server.mount_url(), "Serving files");
        eprintln!("Serving {} on {}", root.display(), server.mount_url());

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        info!("Interrupted, shutting down");

        server.stop().await;
        Ok(())
    })
}
