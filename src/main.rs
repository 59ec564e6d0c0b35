//! rover-link: a single-peer command server for remote sensors
//!
//! A remote device (e.g. a camera-equipped rover) connects, uploads a frame
//! as raw bytes and receives a short UTF-8 control command in return. The
//! exchange repeats on the same connection until the device stops sending.
//!
//! Features:
//! - Exactly one peer per run, served sequentially
//! - Header-less framing: a short read ends each payload
//! - Configurable fixed decision command
//! - Configuration via CLI arguments or TOML file

mod config;
mod decision;
mod error;
mod framing;
mod listener;
mod server;
mod session;

use config::Config;
use decision::FixedCommand;
use server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        backlog = config.backlog,
        buffer_size = config.buffer_size,
        decision = %config.decision,
        "Starting rover-link server"
    );

    // One connection, served sequentially: no worker threads.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config)).map_err(|e| {
        error!(error = %e, "server stopped");
        e
    })
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let decider = Box::new(FixedCommand::new(config.decision.clone()));
    let server = Server::bind(config, decider).await?;
    let summary = server.run().await?;

    info!(
        rounds = summary.rounds,
        bytes_received = summary.bytes_received,
        bytes_sent = summary.bytes_sent,
        "session finished"
    );
    Ok(())
}
