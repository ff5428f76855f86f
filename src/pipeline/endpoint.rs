//! The fixed download target and the request sent to it.

use std::fmt;

use super::constants::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT};

/// Host, port, and resource path that every pipeline in a batch targets.
///
/// Built once and shared read-only between pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    /// Returns the host name (or IP literal).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the requested resource path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds the request text: a `GET` line, a `Host` header, and the blank
    /// terminator line. No other headers and no body.
    #[must_use]
    pub fn request(&self) -> String {
        format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", self.path, self.host)
    }

    /// Returns the UTF-8 encoding of [`Endpoint::request`].
    #[must_use]
    pub fn request_bytes(&self) -> Vec<u8> {
        self.request().into_bytes()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PATH)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.host, self.port, self.path)
    }
}
