//! CLI entry point for the fan-out downloader.

use anyhow::Result;
use clap::Parser;
use fanout_core::{Endpoint, FanOut};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let endpoint = Endpoint::new(args.host, args.port, args.path);
    info!(%endpoint, mode = %args.mode, count = args.count, "Fan-out starting");

    let fanout = FanOut::tcp(endpoint).with_driver(args.mode);
    let report = fanout.run_batch(args.count).await?;

    info!(
        requested = report.requested(),
        terminal = report.terminal(),
        "All downloads finished"
    );

    Ok(())
}
