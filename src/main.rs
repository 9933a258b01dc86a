//! # Influx Bridge
//!
//! Persist robot telemetry UDP datagrams to InfluxDB.
//!
//! Listens for binary measurement datagrams on a local UDP port, decodes
//! them against the fixed telemetry schema, and writes one point per
//! non-empty batch to an InfluxDB database.

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber;

mod config;
mod error;
mod pipeline;
mod sink;
mod source;
mod wire;

use config::Config;
use pipeline::Pipeline;
use sink::InfluxSink;
use source::UdpDatagramSource;

/// Main entry point for the Influx Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (optional TOML path as first CLI argument,
///      built-in defaults otherwise)
///    - Bind the UDP datagram source and build the InfluxDB sink
///
/// 2. **Main Loop**
///    - Run the pipeline: decode → filter → map → persist, per datagram
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Let an in-flight datagram finish, flush buffered points
///    - Log the final counters and exit
///
/// # Errors
///
/// Returns an error (non-zero exit) if:
/// - The configuration file is unreadable or invalid
/// - The UDP port cannot be bound
/// - The storage sink fails unrecoverably
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Influx Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        None => Config::default(),
    };

    let source = UdpDatagramSource::bind(config.udp.port).await?;
    let sink = InfluxSink::new(&config.influx);
    let mut pipeline = Pipeline::new(source, sink);

    // Translate Ctrl+C into the pipeline's stop signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    info!(
        "Forwarding telemetry from UDP port {} to {} (database '{}')",
        config.udp.port, config.influx.url, config.influx.database
    );
    info!("Press Ctrl+C to exit");

    match pipeline.run(shutdown_rx).await {
        Ok(stats) => {
            info!(
                "Total: {} datagrams received, {} points written",
                stats.received, stats.points_written
            );
            Ok(())
        }
        Err(e) => {
            error!("Pipeline stopped with fatal error: {}", e);
            Err(e.into())
        }
    }
}
