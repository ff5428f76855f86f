//! One in-flight download: state machine, leased transport, and resolver.
//!
//! [`Download::perform`] is the only place I/O happens. It executes one
//! [`Action`] and returns the matching [`Event`]. The drivers differ only in
//! how they sequence `perform` and [`Download::advance`].

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::endpoint::Endpoint;
use super::error::FetchError;
use super::state::{Action, Event, Outcome, PipelineState, Stage};
use crate::net::{Lease, Resolver, Transport};

/// A single download pipeline and the resources it exclusively owns.
pub struct Download {
    state: PipelineState,
    lease: Lease,
    resolver: Arc<dyn Resolver>,
}

impl Download {
    /// Creates pipeline `id` targeting `endpoint` over `transport`.
    #[must_use]
    pub fn new(
        id: usize,
        endpoint: Arc<Endpoint>,
        transport: Box<dyn Transport>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        Self {
            state: PipelineState::new(id, endpoint),
            lease: Lease::new(transport),
            resolver,
        }
    }

    /// Returns the pipeline's index within its batch.
    #[must_use]
    pub fn id(&self) -> usize {
        self.state.id()
    }

    /// Returns the current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Returns the first action.
    #[must_use]
    pub fn start(&self) -> Action {
        self.state.start()
    }

    /// Feeds a completion to the state machine and returns the next action.
    pub fn advance(&mut self, event: Event) -> Action {
        self.state.advance(event)
    }

    /// Performs `action` and returns its completion.
    ///
    /// [`Action::Finish`] releases the transport and returns `None`.
    pub async fn perform(&mut self, action: Action) -> Option<Event> {
        let event = match action {
            Action::Resolve { host, port } => {
                Event::Resolved(self.resolver.lookup(&host, port).await)
            }
            Action::Connect(addr) => Event::Connected(self.lease.connect(addr).await),
            Action::Send(bytes) => Event::Sent(self.lease.send(&bytes).await),
            Action::Receive => {
                Event::Received(self.lease.receive_chunk(self.state.buffer_mut()).await)
            }
            Action::Finish => {
                self.lease.release();
                return None;
            }
        };
        Some(event)
    }

    /// Owned form of [`Download::perform`], for drivers that move the
    /// pipeline between completion handlers.
    pub fn step(mut self, action: Action) -> BoxFuture<'static, (Self, Option<Event>)> {
        async move {
            let event = self.perform(action).await;
            (self, event)
        }
        .boxed()
    }

    /// Consumes the pipeline and returns its terminal outcome.
    ///
    /// The transport is released here if `Finish` was never performed.
    pub fn finish(mut self) -> Outcome {
        self.lease.release();
        let stage = self.state.stage();
        self.state.take_outcome().unwrap_or_else(|| {
            Outcome::Failure(FetchError::UnexpectedEvent {
                stage,
                event: "finish",
            })
        })
    }
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("state", &self.state)
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}
