//! devmux
//!
//! Relays a byte stream between one device and a pair of named pipes:
//! bytes written into the input pipe go to the device, bytes the device
//! produces come out on the output pipe.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use devmux_core::tracing_init::init_tracing;
use devmux_relay::endpoints::FdEndpoints;
use devmux_relay::engine::{RelayEngine, StopReason};
use devmux_relay::setup;

#[derive(Parser, Debug)]
#[command(name = "devmux")]
#[command(version, about = "Relay between a device and a pair of named pipes")]
struct Args {
    /// Device to relay, opened read-write.
    #[arg(short = 'd', long, default_value = "/dev/l4pipe0", env = "DEVMUX_DEVICE")]
    device: PathBuf,

    /// Named pipe whose bytes are forwarded to the device (created if missing).
    #[arg(short = 'i', long, default_value = "in", env = "DEVMUX_INPUT")]
    input: PathBuf,

    /// Named pipe carrying the bytes the device produces (created if missing).
    #[arg(short = 'o', long, default_value = "out", env = "DEVMUX_OUTPUT")]
    output: PathBuf,

    /// Capacity in bytes of each relay buffer.
    #[arg(long, default_value_t = 8192, env = "DEVMUX_BUFFER_SIZE")]
    buffer_size: usize,

    /// Log level filter for the relay (e.g. "info", "debug", "trace").
    #[arg(long, default_value = "info", env = "DEVMUX_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "DEVMUX_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&format!("devmux_relay={}", args.log_level), args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        device = %args.device.display(),
        input = %args.input.display(),
        output = %args.output.display(),
        buffer_size = args.buffer_size,
        "Starting devmux"
    );

    if args.buffer_size == 0 {
        anyhow::bail!("--buffer-size must be at least 1");
    }

    setup::ensure_fifo(&args.input)?;
    setup::ensure_fifo(&args.output)?;

    // Open order matters: the device first, then the input pipe (blocks
    // until a writer appears), then the output pipe (blocks until a reader
    // appears).
    let device = setup::open_device(&args.device)?;
    let input = setup::open_input(&args.input)?;
    let output = setup::open_output(&args.output)?;

    for handle in [&input, &device, &output] {
        setup::set_nonblocking(handle)?;
    }

    let endpoints = FdEndpoints::new(input, device, output)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C shutdown signal"),
            _ = sigterm.recv() => info!("Received SIGTERM shutdown signal"),
        }
        let _ = shutdown_tx.send(true);
    });

    // Notify systemd that the relay is ready to serve.
    sd_notify::notify(true, &[sd_notify::NotifyState::Ready])?;

    info!("Relay ready");

    let mut engine = RelayEngine::new(endpoints, args.buffer_size, shutdown_rx);
    match engine.run().await? {
        StopReason::EndOfStream(endpoint) => {
            info!(endpoint = %endpoint, "Peer closed its stream, relay finished");
        }
        StopReason::ShutdownRequested => {
            info!("Relay stopped");
        }
    }
    Ok(())
}
