//! TCP realization of the [`Transport`] contract on top of Tokio.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{Transport, TransportFactory};

/// A TCP connection driven by the Tokio reactor.
///
/// Starts unconnected. `send` and `receive_chunk` fail with
/// [`io::ErrorKind::NotConnected`] until `connect` succeeds.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Creates an unconnected transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a stream is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn stream_mut(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport is not connected"))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, addr: SocketAddr) -> io::Result<()> {
        let stream = TcpStream::connect(addr).await?;
        debug!(%addr, local = ?stream.local_addr().ok(), "tcp stream opened");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(bytes).await?;
        stream.flush().await
    }

    async fn receive_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf).await
    }

    fn release(&mut self) {
        // Dropping the stream closes the socket.
        self.stream = None;
    }
}

/// Opens a new [`TcpTransport`] per pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransportFactory;

impl TransportFactory for TcpTransportFactory {
    fn open(&self) -> Box<dyn Transport> {
        Box::new(TcpTransport::new())
    }
}
