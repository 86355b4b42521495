//! Builder for socket-backed streams
//!
//! [`StreamBuilder`] collects a [`StreamConfig`] through method chaining and
//! finishes with a terminal method that wraps a prepared socket. Connecting
//! and binding stay with `std::net`; the builder only adopts the result.
//!
//! # Examples
//!
//! ```rust,no_run
//! use horizon_socket_stream::StreamBuilder;
//! use std::net::{TcpStream, UdpSocket};
//! use std::time::Duration;
//!
//! // Connected TCP stream, owned by the resulting stream
//! let tcp = StreamBuilder::new()
//!     .owns_socket(true)
//!     .read_timeout(Duration::from_secs(2))?
//!     .tcp(TcpStream::connect("127.0.0.1:8080")?)?;
//!
//! // UDP socket associated with one peer
//! let udp = UdpSocket::bind("0.0.0.0:0")?;
//! udp.connect("127.0.0.1:9000")?;
//! let dgram = StreamBuilder::new()
//!     .interactive()
//!     .owns_socket(true)
//!     .udp(udp)?;
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::config::StreamConfig;
use crate::raw::Socket;
use crate::stream::SocketStream;
use crate::transport::Transport;
use std::io;
use std::net::{TcpStream as StdTcpStream, UdpSocket as StdUdpSocket};
use std::time::Duration;

/// Chained configuration for a [`SocketStream`]
///
/// Configuration methods consume the builder and return it, so settings can
/// be chained. Methods that validate their argument return `io::Result`.
#[derive(Debug, Clone, Default)]
pub struct StreamBuilder {
    config: StreamConfig,
}

impl StreamBuilder {
    /// Starts from [`StreamConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn with_config(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Whether the stream closes the socket when it is closed or dropped.
    ///
    /// **Default**: `false`
    pub fn owns_socket(mut self, owns: bool) -> Self {
        self.config.owns_socket = owns;
        self
    }

    /// Receive deadline applied when the stream is built.
    ///
    /// # Errors
    /// `InvalidInput` for a zero duration.
    pub fn read_timeout(mut self, timeout: Duration) -> io::Result<Self> {
        if timeout.is_zero() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "read timeout must be nonzero"));
        }
        self.config.read_timeout = Some(timeout);
        Ok(self)
    }

    /// Send deadline applied when the stream is built.
    ///
    /// # Errors
    /// `InvalidInput` for a zero duration.
    pub fn write_timeout(mut self, timeout: Duration) -> io::Result<Self> {
        if timeout.is_zero() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "write timeout must be nonzero"));
        }
        self.config.write_timeout = Some(timeout);
        Ok(self)
    }

    /// Zero-progress send attempts allowed for ordinary writes.
    ///
    /// **Default**: `5`
    pub fn write_retries(mut self, retries: u32) -> io::Result<Self> {
        if retries == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "write retries must be at least 1"));
        }
        self.config.write_retries = retries;
        Ok(self)
    }

    /// Zero-progress send attempts allowed for the teardown write.
    ///
    /// **Default**: `2`
    pub fn flush_retries(mut self, retries: u32) -> io::Result<Self> {
        if retries == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "flush retries must be at least 1"));
        }
        self.config.flush_retries = retries;
        Ok(self)
    }

    /// Pause between zero-progress send attempts.
    ///
    /// **Default**: `100ms`
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Applies the [`StreamConfig::interactive`] preset, keeping ownership.
    pub fn interactive(mut self) -> Self {
        let owns = self.config.owns_socket;
        self.config = StreamConfig { owns_socket: owns, ..StreamConfig::interactive() };
        self
    }

    /// Applies the [`StreamConfig::bulk`] preset, keeping ownership.
    pub fn bulk(mut self) -> Self {
        let owns = self.config.owns_socket;
        self.config = StreamConfig { owns_socket: owns, ..StreamConfig::bulk() };
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Wraps a connected std TCP stream.
    ///
    /// The std stream is converted into an owned [`Socket`]; set
    /// `owns_socket(true)` so closing the stream releases it.
    pub fn tcp(self, stream: StdTcpStream) -> io::Result<SocketStream<Socket>> {
        self.socket(Socket::from(stream))
    }

    /// Wraps a std UDP socket that has been `connect`ed to its peer.
    ///
    /// # Errors
    /// Fails if the socket has no peer; call `UdpSocket::connect` first.
    pub fn udp(self, socket: StdUdpSocket) -> io::Result<SocketStream<Socket>> {
        self.socket(Socket::from(socket))
    }

    /// Wraps an owned raw socket.
    pub fn socket(self, socket: Socket) -> io::Result<SocketStream<Socket>> {
        self.transport(socket)
    }

    /// Wraps any transport, including `&Socket` and `Arc<Socket>`.
    pub fn transport<T: Transport>(self, transport: T) -> io::Result<SocketStream<T>> {
        SocketStream::with_config(transport, self.config)
    }
}
