//! Scripted transports and resolvers for pipeline and fan-out tests.
//!
//! A [`Script`] fixes how one handle answers each operation. Every handle
//! reports what was asked of it through a shared [`Probe`], so tests can
//! assert the exact operation sequence and the release count.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fanout_core::{Resolver, Transport, TransportFactory};

/// One operation observed by a mock handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Connect(SocketAddr),
    Send(Vec<u8>),
    Receive,
    Release,
}

/// One scripted answer to `receive_chunk`.
#[derive(Debug, Clone)]
pub enum Chunk {
    Data(Vec<u8>),
    Close,
    Reset,
}

/// How one mock handle answers its operations.
///
/// Once the chunk list is exhausted every further receive reports close.
#[derive(Debug, Clone, Default)]
pub struct Script {
    connect_error: Option<io::ErrorKind>,
    send_error: Option<io::ErrorKind>,
    chunks: VecDeque<Chunk>,
    delays: Vec<Duration>,
}

impl Script {
    /// Connects, sends, and immediately sees the peer close.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `parts` as separate chunks, then closes.
    pub fn response(parts: &[&str]) -> Self {
        parts
            .iter()
            .fold(Self::new(), |script, part| script.chunk(part.as_bytes()))
            .close()
    }

    pub fn fail_connect(mut self, kind: io::ErrorKind) -> Self {
        self.connect_error = Some(kind);
        self
    }

    pub fn fail_send(mut self, kind: io::ErrorKind) -> Self {
        self.send_error = Some(kind);
        self
    }

    pub fn chunk(mut self, bytes: &[u8]) -> Self {
        self.chunks.push_back(Chunk::Data(bytes.to_vec()));
        self
    }

    pub fn close(mut self) -> Self {
        self.chunks.push_back(Chunk::Close);
        self
    }

    pub fn reset(mut self) -> Self {
        self.chunks.push_back(Chunk::Reset);
        self
    }

    /// Delays applied before each completion, cycling through the list.
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }
}

/// What a mock handle was asked to do.
#[derive(Debug, Default)]
pub struct Probe {
    ops: Mutex<Vec<Op>>,
    releases: AtomicUsize,
}

impl Probe {
    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn count(&self, matches: impl Fn(&Op) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| matches(op)).count()
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

/// Tracks how many mock handles are connected at once.
#[derive(Debug, Default)]
pub struct Gauge {
    open: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn opened(&self) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A [`Transport`] that follows a [`Script`].
pub struct MockTransport {
    script: Script,
    probe: Arc<Probe>,
    gauge: Option<Arc<Gauge>>,
    connected: bool,
    calls: usize,
}

impl MockTransport {
    pub fn new(script: Script) -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let transport = Self {
            script,
            probe: Arc::clone(&probe),
            gauge: None,
            connected: false,
            calls: 0,
        };
        (transport, probe)
    }

    fn with_gauge(mut self, gauge: Arc<Gauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    async fn pause(&mut self) {
        let delay = if self.script.delays.is_empty() {
            Duration::ZERO
        } else {
            self.script.delays[self.calls % self.script.delays.len()]
        };
        self.calls += 1;
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self, addr: SocketAddr) -> io::Result<()> {
        self.probe.record(Op::Connect(addr));
        self.pause().await;
        if let Some(kind) = self.script.connect_error {
            return Err(io::Error::new(kind, "scripted connect failure"));
        }
        self.connected = true;
        if let Some(gauge) = &self.gauge {
            gauge.opened();
        }
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.probe.record(Op::Send(bytes.to_vec()));
        self.pause().await;
        match self.script.send_error {
            Some(kind) => Err(io::Error::new(kind, "scripted send failure")),
            None => Ok(()),
        }
    }

    async fn receive_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.probe.record(Op::Receive);
        self.pause().await;
        match self.script.chunks.pop_front() {
            None | Some(Chunk::Close) => Ok(0),
            Some(Chunk::Reset) => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "scripted connection reset",
            )),
            Some(Chunk::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.script.chunks.push_front(Chunk::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }

    fn release(&mut self) {
        self.probe.record(Op::Release);
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        if self.connected {
            self.connected = false;
            if let Some(gauge) = &self.gauge {
                gauge.closed();
            }
        }
    }
}

/// Hands out mock handles, one script per handle, and keeps their probes.
#[derive(Default)]
pub struct MockFactory {
    scripts: Mutex<VecDeque<Script>>,
    fallback: Script,
    probes: Mutex<Vec<Arc<Probe>>>,
    gauge: Arc<Gauge>,
}

impl MockFactory {
    /// Every handle follows `script`.
    pub fn uniform(script: Script) -> Self {
        Self {
            fallback: script,
            ..Self::default()
        }
    }

    /// Handles follow `scripts` in order, then `fallback`.
    pub fn sequence(scripts: Vec<Script>, fallback: Script) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback,
            ..Self::default()
        }
    }

    /// Probes of every handle opened so far, in opening order.
    pub fn probes(&self) -> Vec<Arc<Probe>> {
        self.probes.lock().unwrap().clone()
    }

    /// Highest number of simultaneously connected handles.
    pub fn peak_connected(&self) -> usize {
        self.gauge.peak()
    }
}

impl TransportFactory for MockFactory {
    fn open(&self) -> Box<dyn Transport> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let (transport, probe) = MockTransport::new(script);
        self.probes.lock().unwrap().push(probe);
        Box::new(transport.with_gauge(Arc::clone(&self.gauge)))
    }
}

/// Resolver that fails every lookup.
#[derive(Debug, Clone, Copy)]
pub struct FailingResolver {
    pub kind: io::ErrorKind,
}

#[async_trait]
impl Resolver for FailingResolver {
    async fn lookup(&self, host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
        Err(io::Error::new(self.kind, format!("no such host: {host}")))
    }
}

/// Resolver that answers with `addr` and counts lookups.
#[derive(Debug)]
pub struct CountingResolver {
    addr: SocketAddr,
    lookups: AtomicUsize,
}

impl CountingResolver {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for CountingResolver {
    async fn lookup(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(vec![self.addr])
    }
}
