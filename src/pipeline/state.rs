//! The download state machine, independent of any execution model.
//!
//! A [`PipelineState`] never performs I/O. It tells the driver which
//! [`Action`] to perform next, and the driver feeds the completion back as an
//! [`Event`]. Stages advance strictly in order:
//!
//! ```text
//! Resolving -> Connecting -> Sending -> Receiving -> Closed
//!     \            \            \           \
//!      +------------+------------+-----------+---> Failed
//! ```
//!
//! `Closed` and `Failed` are absorbing. Once either is reached the state
//! only ever answers [`Action::Finish`].

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::constants::BUFFER_LENGTH;
use super::endpoint::Endpoint;
use super::error::FetchError;

/// Lifecycle stage of one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Looking up the target host.
    Resolving,
    /// Opening the connection.
    Connecting,
    /// Writing the request.
    Sending,
    /// Reading the response until the peer closes.
    Receiving,
    /// Peer closed the connection; response complete.
    Closed,
    /// A stage failed; the pipeline was aborted.
    Failed,
}

impl Stage {
    /// Returns `true` for `Closed` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Lower-case stage name, as used in log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Connecting => "connecting",
            Self::Sending => "sending",
            Self::Receiving => "receiving",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The next operation a driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Look up `host` and report [`Event::Resolved`].
    Resolve {
        /// Host to look up.
        host: String,
        /// Port the addresses should carry.
        port: u16,
    },
    /// Connect to the address and report [`Event::Connected`].
    Connect(SocketAddr),
    /// Send the bytes and report [`Event::Sent`].
    Send(Vec<u8>),
    /// Read one chunk into the pipeline's buffer and report [`Event::Received`].
    Receive,
    /// The pipeline is terminal. Release the transport and collect the outcome.
    Finish,
}

/// Completion of the operation requested by the preceding [`Action`].
#[derive(Debug)]
pub enum Event {
    /// Lookup finished.
    Resolved(io::Result<Vec<SocketAddr>>),
    /// Connect finished.
    Connected(io::Result<()>),
    /// Send finished.
    Sent(io::Result<()>),
    /// Receive finished; `Ok(0)` means the peer closed the connection.
    Received(io::Result<usize>),
}

impl Event {
    /// Short name of the completion, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolve",
            Self::Connected(_) => "connect",
            Self::Sent(_) => "send",
            Self::Received(_) => "receive",
        }
    }
}

/// Terminal result of one download.
#[derive(Debug)]
pub enum Outcome {
    /// Full response text, received up to the peer's orderly close.
    Success(String),
    /// The stage failure that aborted the download.
    Failure(FetchError),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the response text on success.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Success(text) => Some(text),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error on failure.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of a failed download.
    pub fn into_result(self) -> Result<String, FetchError> {
        match self {
            Self::Success(text) => Ok(text),
            Self::Failure(err) => Err(err),
        }
    }
}

/// Per-download state: stage, receive buffer, and accumulated response.
///
/// Mutated only through [`PipelineState::advance`], one completion at a time.
#[derive(Debug)]
pub struct PipelineState {
    id: usize,
    endpoint: Arc<Endpoint>,
    stage: Stage,
    peer: Option<SocketAddr>,
    buffer: Box<[u8]>,
    response: Vec<u8>,
    outcome: Option<Outcome>,
}

impl PipelineState {
    /// Creates the state for pipeline `id`, positioned at `Resolving`.
    #[must_use]
    pub fn new(id: usize, endpoint: Arc<Endpoint>) -> Self {
        Self {
            id,
            endpoint,
            stage: Stage::Resolving,
            peer: None,
            buffer: vec![0u8; BUFFER_LENGTH].into_boxed_slice(),
            response: Vec::new(),
            outcome: None,
        }
    }

    /// Returns the pipeline's index within its batch.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the target endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the address chosen after resolution, if any.
    #[must_use]
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Returns the number of response bytes accumulated so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.response.len()
    }

    /// Buffer that the next receive operation reads into.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Returns the first action of a fresh pipeline.
    ///
    /// A pipeline that has already left `Resolving` gets [`Action::Finish`];
    /// the lookup is never issued twice.
    #[must_use]
    pub fn start(&self) -> Action {
        match self.stage {
            Stage::Resolving => {
                debug!(pipeline = self.id, host = self.endpoint.host(), "resolving");
                Action::Resolve {
                    host: self.endpoint.host().to_owned(),
                    port: self.endpoint.port(),
                }
            }
            _ => Action::Finish,
        }
    }

    /// Applies one completion and returns the next action.
    pub fn advance(&mut self, event: Event) -> Action {
        match (self.stage, event) {
            (Stage::Resolving, Event::Resolved(Ok(addrs))) => match addrs.first() {
                Some(&addr) => {
                    self.peer = Some(addr);
                    self.stage = Stage::Connecting;
                    info!(pipeline = self.id, %addr, "connecting");
                    Action::Connect(addr)
                }
                None => self.fail(FetchError::resolve(
                    self.endpoint.host(),
                    io::Error::new(io::ErrorKind::NotFound, "lookup returned no addresses"),
                )),
            },
            (Stage::Resolving, Event::Resolved(Err(source))) => {
                self.fail(FetchError::resolve(self.endpoint.host(), source))
            }
            (Stage::Connecting, Event::Connected(Ok(()))) => {
                info!(pipeline = self.id, "connected");
                self.stage = Stage::Sending;
                info!(pipeline = self.id, "sending");
                Action::Send(self.endpoint.request_bytes())
            }
            (Stage::Connecting, Event::Connected(Err(source))) => self.fail(FetchError::connect(
                self.endpoint.host(),
                self.endpoint.port(),
                source,
            )),
            (Stage::Sending, Event::Sent(Ok(()))) => {
                info!(pipeline = self.id, "sent");
                self.stage = Stage::Receiving;
                info!(pipeline = self.id, "receiving");
                Action::Receive
            }
            (Stage::Sending, Event::Sent(Err(source))) => self.fail(FetchError::send(source)),
            (Stage::Receiving, Event::Received(Ok(0))) => self.close(),
            (Stage::Receiving, Event::Received(Ok(n))) => {
                let n = n.min(self.buffer.len());
                self.response.extend_from_slice(&self.buffer[..n]);
                trace!(
                    pipeline = self.id,
                    bytes = n,
                    total = self.response.len(),
                    "chunk received"
                );
                Action::Receive
            }
            (Stage::Receiving, Event::Received(Err(source))) => {
                self.fail(FetchError::receive(self.response.len(), source))
            }
            (stage, event) if stage.is_terminal() => {
                warn!(
                    pipeline = self.id,
                    %stage,
                    event = event.name(),
                    "completion delivered to a finished pipeline; ignoring"
                );
                Action::Finish
            }
            (stage, event) => self.fail(FetchError::UnexpectedEvent {
                stage,
                event: event.name(),
            }),
        }
    }

    /// Removes the terminal outcome. `None` before a terminal stage or once taken.
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    fn fail(&mut self, error: FetchError) -> Action {
        warn!(
            pipeline = self.id,
            stage = %error.stage(),
            error = %error,
            "download failed"
        );
        self.response = Vec::new();
        self.stage = Stage::Failed;
        self.outcome = Some(Outcome::Failure(error));
        Action::Finish
    }

    fn close(&mut self) -> Action {
        let bytes = std::mem::take(&mut self.response);
        let text = String::from_utf8_lossy(&bytes).into_owned();
        info!(pipeline = self.id, bytes = bytes.len(), "response received");
        info!(target: "fanout::response", pipeline = self.id, "{text}");
        self.stage = Stage::Closed;
        self.outcome = Some(Outcome::Success(text));
        Action::Finish
    }
}
