//! Transport and name-resolution seams for the download pipeline.
//!
//! The pipeline never touches sockets or DNS directly. It talks to a
//! [`Transport`] (one network connection exposing connect, send, and
//! receive) and a [`Resolver`] (hostname to address lookup). Production code
//! uses [`TcpTransport`] and [`SystemResolver`]; tests plug in scripted
//! implementations.
//!
//! # Ownership
//!
//! Each pipeline owns exactly one handle, wrapped in a [`Lease`]. The lease
//! releases the handle at most once, either explicitly when the pipeline
//! reaches a terminal state or implicitly when it is dropped.
//!
//! Every operation takes `&mut self`, so two overlapping operations on the
//! same handle cannot be expressed.

mod resolver;
mod tcp;

pub use resolver::{Resolver, StaticResolver, SystemResolver};
pub use tcp::{TcpTransport, TcpTransportFactory};

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tracing::trace;

/// One network connection with asynchronous connect, send, and receive.
///
/// Each call completes exactly once with success or failure.
#[async_trait]
pub trait Transport: Send {
    /// Opens the connection to `addr`.
    async fn connect(&mut self, addr: SocketAddr) -> io::Result<()>;

    /// Writes all of `bytes` to the peer.
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads the next chunk into `buf`.
    ///
    /// Returns `Ok(0)` when the peer closed the connection in an orderly way.
    async fn receive_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Closes the connection and frees its resources.
    fn release(&mut self);
}

/// Creates a fresh [`Transport`] for each pipeline.
pub trait TransportFactory: Send + Sync {
    /// Opens a new, unconnected handle.
    fn open(&self) -> Box<dyn Transport>;
}

/// Exclusive, scoped ownership of one transport handle.
///
/// The underlying handle's [`Transport::release`] runs exactly once: on the
/// first call to [`Lease::release`], or on drop if that never happened.
/// Operations issued after release fail with [`io::ErrorKind::NotConnected`].
pub struct Lease {
    handle: Option<Box<dyn Transport>>,
}

impl Lease {
    /// Takes ownership of `handle`.
    #[must_use]
    pub fn new(handle: Box<dyn Transport>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Returns `true` once the handle has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Releases the handle. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => {
                handle.release();
                trace!("transport handle released");
                true
            }
            None => false,
        }
    }

    /// Connects the leased handle.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `NotConnected` after release.
    pub async fn connect(&mut self, addr: SocketAddr) -> io::Result<()> {
        self.handle()?.connect(addr).await
    }

    /// Sends `bytes` over the leased handle.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `NotConnected` after release.
    pub async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.handle()?.send(bytes).await
    }

    /// Receives one chunk into `buf`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `NotConnected` after release.
    pub async fn receive_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle()?.receive_chunk(buf).await
    }

    fn handle(&mut self) -> io::Result<&mut (dyn Transport + 'static)> {
        self.handle
            .as_deref_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport already released"))
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.release();
    }
}
