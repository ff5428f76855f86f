//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mock_transport;
pub mod socket_guard;

use std::sync::Arc;

use fanout_core::DriverKind;
use fanout_core::pipeline::{Download, Endpoint, Outcome, callbacks, continuations, suspend};
use fanout_core::{Resolver, StaticResolver};

use mock_transport::{MockTransport, Probe, Script};

/// Address every test resolver answers with (TEST-NET-1).
pub const TEST_ADDR: &str = "192.0.2.10:80";

/// Endpoint used by mock-transport tests.
pub fn test_endpoint() -> Arc<Endpoint> {
    Arc::new(Endpoint::new("example.test", 80, "/lecture.html"))
}

/// Resolver that always answers with [`TEST_ADDR`].
pub fn test_resolver() -> Arc<dyn Resolver> {
    Arc::new(StaticResolver::single(TEST_ADDR.parse().expect("valid test address")))
}

/// Builds pipeline `0` over a scripted transport.
pub fn scripted_download(script: Script) -> (Download, Arc<Probe>) {
    scripted_download_with(script, test_resolver())
}

/// Builds pipeline `0` over a scripted transport and the given resolver.
pub fn scripted_download_with(
    script: Script,
    resolver: Arc<dyn Resolver>,
) -> (Download, Arc<Probe>) {
    let (transport, probe) = MockTransport::new(script);
    let download = Download::new(0, test_endpoint(), Box::new(transport), resolver);
    (download, probe)
}

/// Runs `download` to completion with the selected driver.
pub async fn run_with(driver: DriverKind, download: Download) -> Outcome {
    match driver {
        DriverKind::Callbacks => callbacks::run(download)
            .await
            .expect("callback chain completed"),
        DriverKind::Continuations => continuations::run(download).await,
        DriverKind::Async => suspend::run(download).await,
    }
}
