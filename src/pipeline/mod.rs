//! Download pipeline: resolve, connect, send, and receive until close.
//!
//! The pipeline is split into a pure state machine and interchangeable
//! drivers:
//!
//! - [`PipelineState`] - stages, buffers, and transitions; never does I/O
//! - [`Download`] - owns one state, one leased transport, and a resolver;
//!   performs a single [`Action`] at a time
//! - [`callbacks`] - completion-handler chaining
//! - [`continuations`] - future continuation chains
//! - [`suspend`] - `async`/`await` with cooperative suspension
//!
//! All three drivers produce the same stage sequence, the same log lines, and
//! the same [`Outcome`] for the same transport behavior.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fanout_core::net::{SystemResolver, TcpTransport};
//! use fanout_core::pipeline::{Download, Endpoint, suspend};
//!
//! # async fn example() {
//! let download = Download::new(
//!     0,
//!     Arc::new(Endpoint::default()),
//!     Box::new(TcpTransport::new()),
//!     Arc::new(SystemResolver),
//! );
//! match suspend::run(download).await.into_result() {
//!     Ok(text) => println!("{text}"),
//!     Err(err) => eprintln!("failed while {}: {err}", err.stage()),
//! }
//! # }
//! ```

pub mod callbacks;
mod constants;
pub mod continuations;
mod download;
mod endpoint;
mod error;
mod state;
pub mod suspend;

pub use constants::{BUFFER_LENGTH, DEFAULT_DOWNLOAD_COUNT, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT};
pub use download::Download;
pub use endpoint::Endpoint;
pub use error::FetchError;
pub use state::{Action, Event, Outcome, PipelineState, Stage};
