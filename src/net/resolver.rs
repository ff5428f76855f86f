//! Hostname resolution behind an async trait.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tracing::debug;

/// Asynchronous hostname to address lookup.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the addresses for `host`, each carrying `port`.
    ///
    /// An empty list is a valid answer; callers decide how to treat it.
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}

/// Resolves through the operating system via [`tokio::net::lookup_host`].
///
/// IP literals are returned directly without a DNS query.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port)).await?.collect();
        debug!(count = addrs.len(), "host resolved");
        Ok(addrs)
    }
}

/// Answers every lookup with a fixed address list.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    addrs: Vec<SocketAddr>,
}

impl StaticResolver {
    /// Creates a resolver that always returns `addrs`.
    #[must_use]
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self { addrs }
    }

    /// Creates a resolver that always returns the single address `addr`.
    #[must_use]
    pub fn single(addr: SocketAddr) -> Self {
        Self::new(vec![addr])
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn lookup(&self, _host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok(self
            .addrs
            .iter()
            .map(|addr| SocketAddr::new(addr.ip(), port))
            .collect())
    }
}
