//! CLI argument definitions using clap derive macros.

use clap::Parser;
use clap::builder::TypedValueParser;

use fanout_core::pipeline::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT};
use fanout_core::{DEFAULT_DOWNLOAD_COUNT, DriverKind};

/// Download one page concurrently over raw HTTP/1.1.
///
/// Launches a batch of independent downloads against a single endpoint and
/// waits until every download has finished or failed.
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of concurrent downloads (0-1000)
    #[arg(short = 'n', long, default_value_t = DEFAULT_DOWNLOAD_COUNT, value_parser = clap::value_parser!(u64).range(0..=1000).map(|n| n as usize))]
    pub count: usize,

    /// Execution model: callbacks, continuations, or async
    #[arg(short, long, default_value_t = DriverKind::Callbacks)]
    pub mode: DriverKind,

    /// Target host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Target port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Resource path to request
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,
}
