//! Stream configuration
//!
//! [`StreamConfig`] holds the knobs that shape how a
//! [`SocketStream`](crate::SocketStream) drives its socket: who owns the
//! socket, the per-direction deadlines, and the retry policy used when the
//! transport accepts zero bytes.
//!
//! # Retry Policy
//!
//! A send that accepts no bytes while data is still pending is treated as
//! backpressure. The stream sleeps for `retry_backoff` and spends one unit of
//! its budget; any progress refills the budget. Ordinary writes start with
//! `write_retries`, the best-effort teardown write with `flush_retries`.
//!
//! # Examples
//!
//! ```rust
//! use horizon_socket_stream::StreamConfig;
//! use std::time::Duration;
//!
//! // Chatty request/response traffic
//! let interactive = StreamConfig::interactive();
//!
//! // Custom: own the socket and give up on stalled sends sooner
//! let custom = StreamConfig {
//!     owns_socket: true,
//!     write_retries: 3,
//!     retry_backoff: Duration::from_millis(20),
//!     ..Default::default()
//! };
//! assert!(custom.validate().is_ok());
//! ```

use std::io;
use std::time::Duration;

/// Zero-progress send attempts allowed for an ordinary write.
pub const DEFAULT_WRITE_RETRIES: u32 = 5;
/// Zero-progress send attempts allowed for the best-effort teardown write.
pub const DEFAULT_FLUSH_RETRIES: u32 = 2;
/// Pause between zero-progress send attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Configuration for a socket-backed stream
#[derive(Clone, Debug, PartialEq)]
pub struct StreamConfig {
/// Close the wrapped socket when the stream is closed or dropped
///
/// Leave this `false` when something else (another stream, a peer-info
/// query object) still uses the same handle.
///
/// **Default**: `false`
pub owns_socket: bool,

/// Receive deadline applied to the socket when the stream is created
///
/// - `None`: leave the socket's current setting untouched
/// - `Some(d)`: block at most `d` waiting for data (`d` must be nonzero)
///
/// **Default**: `None`
pub read_timeout: Option<Duration>,

/// Send deadline applied to the socket when the stream is created
///
/// Same semantics as `read_timeout`. A send that hits this deadline counts
/// as a zero-progress attempt.
///
/// **Default**: `None`
pub write_timeout: Option<Duration>,

/// Zero-progress send attempts before an ordinary write fails
///
/// **Default**: `5`
pub write_retries: u32,

/// Zero-progress send attempts before the teardown write gives up
///
/// **Default**: `2`
pub flush_retries: u32,

/// Sleep between zero-progress send attempts
///
/// **Default**: `100ms`
pub retry_backoff: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            owns_socket: false,
            read_timeout: None,
            write_timeout: None,
            write_retries: DEFAULT_WRITE_RETRIES,
            flush_retries: DEFAULT_FLUSH_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl StreamConfig {
    /// Short deadlines for request/response traffic
    ///
    /// Reads give up after 5s, sends after 1s, and stalled writes are
    /// retried on a tighter 20ms backoff.
    pub fn interactive() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(1)),
            retry_backoff: Duration::from_millis(20),
            ..Self::default()
        }
    }

    /// Long deadlines for bulk transfers
    ///
    /// Tolerates slow receivers: 60s deadlines in both directions and twice
    /// the usual zero-progress budget for ordinary writes.
    pub fn bulk() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(60)),
            write_timeout: Some(Duration::from_secs(60)),
            write_retries: DEFAULT_WRITE_RETRIES * 2,
            ..Self::default()
        }
    }

    /// Rejects zero deadlines and empty retry budgets.
    pub fn validate(&self) -> io::Result<()> {
        if self.read_timeout.is_some_and(|d| d.is_zero()) || self.write_timeout.is_some_and(|d| d.is_zero()) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "timeouts must be nonzero"));
        }
        if self.write_retries == 0 || self.flush_retries == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "retry budgets must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert!(!config.owns_socket);
        assert_eq!(config.write_retries, 5);
        assert_eq!(config.flush_retries, 2);
        assert_eq!(config.retry_backoff, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(StreamConfig::interactive().validate().is_ok());
        assert!(StreamConfig::bulk().validate().is_ok());
        assert_eq!(StreamConfig::bulk().write_retries, 10);
        assert_eq!(StreamConfig::interactive().flush_retries, 2);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = StreamConfig { read_timeout: Some(Duration::ZERO), ..Default::default() };
        assert_eq!(config.validate().unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_empty_budget_rejected() {
        let config = StreamConfig { flush_retries: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
