//! Fan-out coordinator: launch N independent pipelines and wait for all.
//!
//! # Overview
//!
//! [`FanOut::run_batch`] starts `count` pipelines against one shared,
//! read-only [`Endpoint`], using the configured [`DriverKind`]. Each pipeline
//! holds a [`SignalGuard`] on a shared [`Countdown`]; the guard fires exactly
//! once when the pipeline's terminal handler runs (or is dropped). The batch
//! returns when the last guard fires.
//!
//! Individual results are not inspected here. Each pipeline reports its own
//! success or failure where it happens, and a batch with failures still
//! completes normally.
//!
//! # Example
//!
//! ```no_run
//! use fanout_core::coordinator::{DriverKind, FanOut};
//! use fanout_core::pipeline::Endpoint;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fanout = FanOut::tcp(Endpoint::default()).with_driver(DriverKind::Async);
//! let report = fanout.run_batch(3).await?;
//! assert_eq!(report.terminal(), 3);
//! # Ok(())
//! # }
//! ```

mod countdown;

pub use countdown::{Countdown, SignalGuard};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, info, instrument};

use crate::net::{Resolver, SystemResolver, TcpTransportFactory, TransportFactory};
use crate::pipeline::{Download, Endpoint, Outcome, callbacks, continuations, suspend};

/// Largest batch accepted by [`FanOut::run_batch`].
pub const MAX_DOWNLOAD_COUNT: usize = 1000;

/// Error type for coordinator operations.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Requested batch size is above [`MAX_DOWNLOAD_COUNT`].
    #[error("invalid download count {value}: must be at most {MAX_DOWNLOAD_COUNT}")]
    InvalidCount {
        /// The rejected count.
        value: usize,
    },

    /// Driver name not recognised.
    #[error("unknown driver '{name}': expected callbacks, continuations, or async")]
    UnknownDriver {
        /// The rejected name.
        name: String,
    },
}

/// Execution model used to drive each pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverKind {
    /// Completion-handler chaining.
    #[default]
    Callbacks,
    /// Future continuation chains.
    Continuations,
    /// `async`/`await`.
    Async,
}

impl DriverKind {
    /// All drivers, in declaration order.
    pub const ALL: [Self; 3] = [Self::Callbacks, Self::Continuations, Self::Async];

    /// Returns the CLI name of the driver.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Callbacks => "callbacks",
            Self::Continuations => "continuations",
            Self::Async => "async",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "callbacks" | "callback" => Ok(Self::Callbacks),
            "continuations" | "continuation" | "tasks" => Ok(Self::Continuations),
            "async" | "await" => Ok(Self::Async),
            _ => Err(CoordinatorError::UnknownDriver { name: s.to_owned() }),
        }
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    requested: usize,
    terminal: usize,
}

impl BatchReport {
    /// Returns the number of pipelines launched.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Returns the number of pipelines that reached a terminal state.
    #[must_use]
    pub fn terminal(&self) -> usize {
        self.terminal
    }
}

/// Launches batches of concurrent downloads against one endpoint.
pub struct FanOut {
    endpoint: Arc<Endpoint>,
    resolver: Arc<dyn Resolver>,
    transports: Arc<dyn TransportFactory>,
    driver: DriverKind,
}

impl FanOut {
    /// Creates a coordinator using the default [`DriverKind`].
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        resolver: Arc<dyn Resolver>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            resolver,
            transports,
            driver: DriverKind::default(),
        }
    }

    /// Creates a coordinator that resolves through the OS and connects over TCP.
    #[must_use]
    pub fn tcp(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Arc::new(SystemResolver), Arc::new(TcpTransportFactory))
    }

    /// Selects the driver used for subsequent batches.
    #[must_use]
    pub fn with_driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }

    /// Returns the configured driver.
    #[must_use]
    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    /// Returns the shared endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Launches `count` pipelines and waits until every one is terminal.
    ///
    /// There is no ordering between pipelines. Failed pipelines count toward
    /// completion exactly like successful ones.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidCount`] if `count` exceeds
    /// [`MAX_DOWNLOAD_COUNT`]. Pipeline failures never surface here.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[instrument(skip(self), fields(driver = %self.driver, endpoint = %self.endpoint))]
    pub async fn run_batch(&self, count: usize) -> Result<BatchReport, CoordinatorError> {
        if count > MAX_DOWNLOAD_COUNT {
            return Err(CoordinatorError::InvalidCount { value: count });
        }

        info!(count, "starting batch");
        let countdown = Arc::new(Countdown::new(count));

        for id in 0..count {
            let download = Download::new(
                id,
                Arc::clone(&self.endpoint),
                self.transports.open(),
                Arc::clone(&self.resolver),
            );
            let guard = countdown.guard();
            let on_terminal = move |_outcome: Outcome| {
                debug!(pipeline = id, "pipeline terminal");
                drop(guard);
            };

            match self.driver {
                DriverKind::Callbacks => callbacks::start(download, on_terminal),
                DriverKind::Continuations => {
                    tokio::spawn(continuations::run(download).map(on_terminal));
                }
                DriverKind::Async => {
                    tokio::spawn(suspend::run(download).map(on_terminal));
                }
            }
        }

        debug!(count, "waiting for pipelines to finish");
        countdown.wait().await;

        let report = BatchReport {
            requested: count,
            terminal: countdown.signalled(),
        };
        info!(terminal = report.terminal, "batch complete");
        Ok(report)
    }
}

impl fmt::Debug for FanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOut")
            .field("endpoint", &self.endpoint)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}
