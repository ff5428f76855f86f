//! Constants for the download pipeline (target, buffer sizing, batch size).

/// Default target host.
pub const DEFAULT_HOST: &str = "www.cs.ubbcluj.ro";

/// Default target port (plain HTTP).
pub const DEFAULT_PORT: u16 = 80;

/// Default resource requested from the target.
pub const DEFAULT_PATH: &str = "/~rlupsa/edu/pdp/lecture-5-futures-continuations.html";

/// Size of the per-pipeline receive buffer, reused across receive calls.
pub const BUFFER_LENGTH: usize = 1024;

/// Default number of concurrent downloads per batch.
pub const DEFAULT_DOWNLOAD_COUNT: usize = 3;
