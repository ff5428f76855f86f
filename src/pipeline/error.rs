//! Error types for the download pipeline.
//!
//! Every variant names the stage that failed and wraps the underlying
//! resolver or transport error.

use std::io;

use thiserror::Error;

use super::state::Stage;

/// Errors that terminate a single download pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Hostname lookup failed or returned no address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        /// The host being looked up.
        host: String,
        /// The underlying resolver error.
        #[source]
        source: io::Error,
    },

    /// Connection was refused, unreachable, or otherwise failed.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        /// The target host.
        host: String,
        /// The target port.
        port: u16,
        /// The underlying transport error.
        #[source]
        source: io::Error,
    },

    /// The request could not be written.
    #[error("failed to send request: {source}")]
    Send {
        /// The underlying transport error.
        #[source]
        source: io::Error,
    },

    /// The connection was reset while reading the response.
    ///
    /// Any partial response is discarded.
    #[error("failed to receive response after {received} bytes: {source}")]
    Receive {
        /// Bytes received before the failure.
        received: usize,
        /// The underlying transport error.
        #[source]
        source: io::Error,
    },

    /// A completion arrived that does not belong to the current stage.
    #[error("unexpected {event} completion while {stage}")]
    UnexpectedEvent {
        /// The stage the pipeline was in.
        stage: Stage,
        /// Name of the completion that arrived.
        event: &'static str,
    },
}

impl FetchError {
    /// Creates a resolve error.
    pub fn resolve(host: impl Into<String>, source: io::Error) -> Self {
        Self::Resolve {
            host: host.into(),
            source,
        }
    }

    /// Creates a connect error.
    pub fn connect(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            port,
            source,
        }
    }

    /// Creates a send error.
    #[must_use]
    pub fn send(source: io::Error) -> Self {
        Self::Send { source }
    }

    /// Creates a receive error.
    #[must_use]
    pub fn receive(received: usize, source: io::Error) -> Self {
        Self::Receive { received, source }
    }

    /// Returns the stage at which the failure occurred.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Resolve { .. } => Stage::Resolving,
            Self::Connect { .. } => Stage::Connecting,
            Self::Send { .. } => Stage::Sending,
            Self::Receive { .. } => Stage::Receiving,
            Self::UnexpectedEvent { stage, .. } => *stage,
        }
    }
}
