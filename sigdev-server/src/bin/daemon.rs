//! Signature device daemon binary.
//!
//! Runs as a standalone process that creates signature devices and signs
//! payloads on their behalf via Unix socket.

use clap::Parser;
use sigdev_domain::{DeviceService, DeviceStore};
use sigdev_server::{DeviceServer, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Signature device daemon.
#[derive(Parser, Debug)]
#[command(name = "sigdev-daemon")]
#[command(about = "Daemon issuing signature devices and chained signatures")]
#[command(version)]
struct Args {
    /// Path to Unix socket for client connections
    #[arg(long, env = "SIGDEV_SOCKET", default_value = "/var/run/sigdev.sock")]
    socket: PathBuf,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting sigdev-daemon");
    info!("Socket path: {:?}", args.socket);

    let service = Arc::new(DeviceService::new(DeviceStore::new()));

    let config = ServerConfig {
        socket_path: args.socket,
    };

    let server = match DeviceServer::new(config, service) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create server: {}", e);
            std::process::exit(1);
        }
    };

    info!("Device daemon ready, waiting for connections...");

    if let Err(e) = server.run() {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
