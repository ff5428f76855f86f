//! Fan-out Core Library
//!
//! This library runs a fixed number of concurrent raw HTTP/1.1 downloads
//! against one endpoint. Each download resolves the host, connects, sends a
//! single `GET` request, and reads until the peer closes the connection.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`net`] - Transport handle and resolver seams, with TCP implementations
//! - [`pipeline`] - Download state machine and its three drivers
//! - [`coordinator`] - Batch fan-out and the completion countdown

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod coordinator;
pub mod net;
pub mod pipeline;

// Re-export commonly used types
pub use coordinator::{
    BatchReport, CoordinatorError, Countdown, DriverKind, FanOut, MAX_DOWNLOAD_COUNT,
};
pub use net::{
    Lease, Resolver, StaticResolver, SystemResolver, TcpTransport, TcpTransportFactory, Transport,
    TransportFactory,
};
pub use pipeline::{
    BUFFER_LENGTH, DEFAULT_DOWNLOAD_COUNT, Download, Endpoint, FetchError, Outcome, Stage,
};
