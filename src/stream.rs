//! Socket-backed byte stream
//!
//! [`SocketStream`] gives one read/write/close contract over either a
//! connected stream socket or a datagram socket associated with a single
//! peer. Callers see a plain byte stream; the stream takes care of
//! shrinking reads to what is already queued, retrying sends that make no
//! progress, and releasing the socket exactly once.
//!
//! # Examples
//!
//! ```rust,no_run
//! use horizon_socket_stream::{SocketStream, raw::Socket};
//! use std::io::{Read, Write};
//! use std::net::TcpStream;
//!
//! let socket = Socket::from(TcpStream::connect("127.0.0.1:8080")?);
//! let mut stream = SocketStream::with_ownership(socket, true)?;
//!
//! stream.write_all(b"ping")?;
//! let mut reply = [0u8; 4];
//! let n = stream.read(&mut reply)?;
//! println!("{} bytes from {}", n, stream.peer_addr());
//! stream.close()?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Threading
//!
//! Every I/O method takes `&mut self`, so one stream is never driven from two
//! threads at once. Wrap it in a `Mutex` to share it.

use crate::config::StreamConfig;
use crate::error;
use crate::raw::Type;
use crate::transport::Transport;
use std::io;
use std::mem::ManuallyDrop;
use std::net::SocketAddr;
use std::time::Duration;

/// How the stream dispatches I/O, fixed when the stream is created
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SocketMode {
    /// Connected socket: plain send/receive
    Stream,
    /// Datagram socket: send-to the recorded peer, receive-from any sender
    Datagram,
}

impl TryFrom<Type> for SocketMode {
    type Error = io::Error;

    fn try_from(ty: Type) -> io::Result<Self> {
        match ty {
            Type::Stream => Ok(SocketMode::Stream),
            Type::Dgram => Ok(SocketMode::Datagram),
            Type::Other(raw) => Err(error::unsupported_mode(raw)),
        }
    }
}

/// Byte stream over a connected stream socket or a peer-bound datagram socket
///
/// The socket must be ready when the stream is created: connected for stream
/// sockets, associated with a peer for datagram sockets. Construction fails
/// otherwise.
///
/// With `owns_socket = true` closing or dropping the stream closes the
/// socket. Otherwise the stream never closes it: a socket passed by value is
/// handed back through [`Transport::release`] on drop, which for
/// [`raw::Socket`](crate::raw::Socket) leaves the OS handle open for its other
/// holders. Use [`into_inner`](Self::into_inner) to take the socket back.
#[derive(Debug)]
pub struct SocketStream<T: Transport> {
    socket: ManuallyDrop<T>,
    mode: SocketMode,
    peer: SocketAddr,
    owns_socket: bool,
    closed: bool,
    config: StreamConfig,
}

impl<T: Transport> SocketStream<T> {
    /// Wraps `socket` without taking ownership of it.
    pub fn new(socket: T) -> io::Result<Self> {
        Self::with_config(socket, StreamConfig::default())
    }

    /// Wraps `socket`; `owns_socket` decides whether closing the stream
    /// closes the socket.
    pub fn with_ownership(socket: T, owns_socket: bool) -> io::Result<Self> {
        Self::with_config(socket, StreamConfig { owns_socket, ..StreamConfig::default() })
    }

    /// Wraps `socket` using every setting in `config`.
    ///
    /// Reads the peer address and the transport type exactly once. Timeouts
    /// present in `config` are applied to the socket.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `config` does not validate
    /// - `NotConnected` if the handle is already invalid
    /// - the native kind with a [`PeerUnavailable`](error::SocketError::PeerUnavailable)
    ///   payload if the socket has no peer
    /// - `Unsupported` for socket types other than stream and datagram
    pub fn with_config(socket: T, config: StreamConfig) -> io::Result<Self> {
        config.validate()?;
        if !socket.is_valid() {
            return Err(error::invalid_handle());
        }
        let peer = socket.peer_addr().map_err(|e| error::peer_unavailable(&e))?;
        let mode = SocketMode::try_from(socket.socket_type()?)?;
        if let Some(t) = config.read_timeout {
            socket.set_read_timeout(Some(t))?;
        }
        if let Some(t) = config.write_timeout {
            socket.set_write_timeout(Some(t))?;
        }
        log::debug!("socket stream opened: mode={:?} peer={} owns={}", mode, peer, config.owns_socket);
        Ok(Self {
            socket: ManuallyDrop::new(socket),
            mode,
            peer,
            owns_socket: config.owns_socket,
            closed: false,
            config,
        })
    }

    pub fn mode(&self) -> SocketMode {
        self.mode
    }

    /// Last known peer. In datagram mode this is the sender of the most
    /// recently received datagram, and the destination of the next send.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn owns_socket(&self) -> bool {
        self.owns_socket
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_readable(&self) -> bool {
        !self.closed
    }

    pub fn is_writable(&self) -> bool {
        !self.closed
    }

    /// Network streams never support seeking.
    pub fn is_seekable(&self) -> bool {
        false
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// The wrapped socket.
    pub fn get_ref(&self) -> &T {
        &self.socket
    }

    /// Unwraps the stream and returns the socket without closing it,
    /// whatever the ownership flag says.
    ///
    /// If the stream was already closed while owning the socket, the socket
    /// comes back closed.
    pub fn into_inner(self) -> T {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the socket is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.socket) }
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(error::closed());
        }
        if !self.socket.is_valid() {
            return Err(error::invalid_handle());
        }
        Ok(())
    }

    /// Reads at most `max_count` bytes into `buf[offset..]`.
    ///
    /// If some bytes are already queued but fewer than `max_count`, only the
    /// queued bytes are requested so the call does not block for more. With
    /// nothing queued the call blocks up to the read timeout.
    ///
    /// Returns the number of bytes read; `0` means the peer shut the
    /// connection down (stream mode) or an empty datagram arrived.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the range falls outside `buf` (no I/O happens)
    /// - `NotConnected` if the stream is closed
    /// - `TimedOut` if the deadline passed with nothing received
    pub fn read_into(&mut self, buf: &mut [u8], offset: usize, max_count: usize) -> io::Result<usize> {
        self.ensure_open()?;
        error::check_range(buf.len(), offset, max_count)?;
        if max_count == 0 {
            return Ok(0);
        }

        let mut count = max_count;
        let available = self.socket.available()?;
        if available > 0 && available < count {
            count = available;
        }
        let region = &mut buf[offset..offset + count];

        loop {
            let res = match self.mode {
                SocketMode::Stream => self.socket.recv(region),
                SocketMode::Datagram => self.socket.recv_from(region).map(|(n, from)| {
                    self.peer = from;
                    n
                }),
            };
            match res {
                Ok(n) => {
                    log::trace!("received {} bytes from {}", n, self.peer);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_deadline(&e) => {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends `buf[offset..offset + count]` in full.
    ///
    /// Partial sends are resumed where they stopped. A send that accepts no
    /// bytes is retried after the configured backoff, up to
    /// [`StreamConfig::write_retries`] times in a row; any progress refills
    /// that budget.
    ///
    /// A send that hits the write timeout counts as one that accepted nothing,
    /// so a peer that stops reading blocks this call for up to
    /// `write_retries × write_timeout + (write_retries − 1) × retry_backoff`
    /// before it fails. With the defaults and a 1 s write timeout that is
    /// 5.4 s. Without a write timeout a stalled send blocks indefinitely.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the range falls outside `buf` (no I/O happens)
    /// - `NotConnected` if the stream is closed
    /// - `WriteZero` if the budget ran out; an unknown prefix may have been sent
    pub fn write_from(&mut self, buf: &[u8], offset: usize, count: usize) -> io::Result<()> {
        self.ensure_open()?;
        error::check_range(buf.len(), offset, count)?;
        self.send_all(&buf[offset..offset + count], self.config.write_retries)
    }

    /// Best-effort write meant to run right before teardown.
    ///
    /// Behaves like [`write_from`](Self::write_from) with the smaller
    /// [`StreamConfig::flush_retries`] budget, but never fails: any problem,
    /// including a closed stream or a bad range, yields `false`.
    pub fn try_write_final(&mut self, buf: &[u8], offset: usize, count: usize) -> bool {
        let res = self
            .ensure_open()
            .and_then(|_| error::check_range(buf.len(), offset, count))
            .and_then(|_| self.send_all(&buf[offset..offset + count], self.config.flush_retries));
        match res {
            Ok(()) => true,
            Err(e) => {
                log::warn!("final write to {} abandoned: {}", self.peer, e);
                false
            }
        }
    }

    fn send_all(&self, mut data: &[u8], budget: u32) -> io::Result<()> {
        let mut retries = budget;
        while !data.is_empty() && retries > 0 {
            let res = match self.mode {
                SocketMode::Stream => self.socket.send(data),
                SocketMode::Datagram => self.socket.send_to(data, self.peer),
            };
            let sent = match res {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_deadline(&e) => 0,
                Err(e) => return Err(e),
            };

            if sent == 0 {
                retries -= 1;
                log::warn!("send to {} made no progress, {} retries left", self.peer, retries);
                if retries > 0 {
                    std::thread::sleep(self.config.retry_backoff);
                }
            } else {
                log::trace!("sent {} bytes to {}", sent, self.peer);
                retries = budget;
                data = &data[sent.min(data.len())..];
            }
        }

        if !data.is_empty() {
            return Err(error::write_stalled(data.len()));
        }
        Ok(())
    }

    /// Bytes queued for reading without blocking.
    ///
    /// Fails (rather than reporting zero) once the stream is closed or the
    /// handle is gone.
    pub fn available(&self) -> io::Result<usize> {
        self.ensure_open()?;
        self.socket.available()
    }

    /// Whether at least one byte can be read without blocking.
    pub fn data_available(&self) -> io::Result<bool> {
        Ok(self.available()? > 0)
    }

    pub fn read_timeout(&self) -> io::Result<Option<Duration>> {
        self.ensure_open()?;
        self.socket.read_timeout()
    }

    /// Sets the receive deadline; `None` blocks forever.
    ///
    /// A zero duration is rejected with `InvalidInput`.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        check_timeout(timeout)?;
        self.ensure_open()?;
        self.socket.set_read_timeout(timeout)
    }

    pub fn write_timeout(&self) -> io::Result<Option<Duration>> {
        self.ensure_open()?;
        self.socket.write_timeout()
    }

    /// Sets the send deadline; `None` blocks forever.
    ///
    /// A zero duration is rejected with `InvalidInput`.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        check_timeout(timeout)?;
        self.ensure_open()?;
        self.socket.set_write_timeout(timeout)
    }

    /// Always fails with `Unsupported`.
    pub fn position(&self) -> io::Result<u64> {
        Err(error::seek_unsupported())
    }

    /// Always fails with `Unsupported`.
    pub fn set_position(&mut self, _pos: u64) -> io::Result<()> {
        Err(error::seek_unsupported())
    }

    /// Always fails with `Unsupported`.
    pub fn set_len(&mut self, _len: u64) -> io::Result<()> {
        Err(error::seek_unsupported())
    }

    /// Closes the stream, and the socket too if the stream owns it.
    ///
    /// Only the first call does anything; later calls return `Ok(())`. An
    /// error from closing the socket is reported by that first call, and the
    /// stream counts as closed regardless.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        log::debug!("socket stream to {} closed (owns={})", self.peer, self.owns_socket);
        if self.owns_socket {
            self.socket.close()?;
        }
        Ok(())
    }

    /// Waits `linger_ms` milliseconds, then [`close`](Self::close)s.
    ///
    /// `-1` closes without waiting. Anything below `-1` fails with
    /// `InvalidInput` and leaves the stream open. The wait is a plain sleep:
    /// it gives in-flight data a grace period but guarantees nothing about
    /// delivery.
    pub fn close_with_linger(&mut self, linger_ms: i32) -> io::Result<()> {
        if linger_ms < -1 {
            return Err(error::invalid_input("linger must be -1 or a non-negative number of milliseconds"));
        }
        if !self.closed && linger_ms > 0 {
            std::thread::sleep(Duration::from_millis(linger_ms as u64));
        }
        self.close()
    }
}

fn check_timeout(timeout: Option<Duration>) -> io::Result<()> {
    match timeout {
        Some(d) if d.is_zero() => Err(error::invalid_input("cannot set a zero duration timeout")),
        _ => Ok(()),
    }
}

/// Deadline expiry shows up as `WouldBlock` on unix and `TimedOut` on Windows.
fn is_deadline(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

impl<T: Transport> io::Read for SocketStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        self.read_into(buf, 0, len)
    }
}

impl<T: Transport> io::Write for SocketStream<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_from(buf, 0, buf.len())?;
        Ok(buf.len())
    }

    /// Nothing is buffered; only checks that the stream is still open.
    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()
    }
}

impl<T: Transport> io::Seek for SocketStream<T> {
    fn seek(&mut self, _pos: io::SeekFrom) -> io::Result<u64> {
        Err(error::seek_unsupported())
    }
}

impl<T: Transport> Drop for SocketStream<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close socket stream on drop: {}", e);
        }
        // SAFETY: the field is not used again after this point.
        let socket = unsafe { ManuallyDrop::take(&mut self.socket) };
        if !self.owns_socket {
            socket.release();
        }
    }
}
