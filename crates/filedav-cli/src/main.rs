#![deny(unsafe_code)]

// Use mimalloc for reduced allocation latency (enabled by default).
// Disable with `--no-default-features` if debugging allocator issues.
#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod config;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "tokio-console")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filedav::ServerMode;

use crate::commands::serve;
use crate::config::Config;

/// Minimal WebDAV file servers over a local directory
#[derive(Parser)]
#[command(name = "filedav")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Full WebDAV server (dav-server) mounted under /dav/
    filedav dav --root ./webdav

    # Hand-rolled GET/PUT/DELETE/OPTIONS/PROPFIND server
    filedav files --root ./uploads --port 9000

    # Upload and fetch a file
    curl -T notes.txt http://localhost:8080/notes.txt
    curl http://localhost:8080/notes.txt
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML configuration file
    #[arg(long, env = "FILEDAV_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory through the dav-server WebDAV handler under /dav/
    Dav(serve::Args),

    /// Serve a directory with the built-in five-verb file server
    Files(serve::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let server_config = match &cli.command {
        Commands::Dav(args) => serve::server_config(ServerMode::Dav, args, &config.dav),
        Commands::Files(args) => serve::server_config(ServerMode::Files, args, &config.files),
    };

    serve::execute(server_config)
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    #[cfg(feature = "tokio-console")]
    {
        use tracing_subscriber::Layer;

        tracing_subscriber::registry()
            .with(console_subscriber::spawn())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into())),
            )
            .init();
    }

    #[cfg(not(feature = "tokio-console"))]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}
