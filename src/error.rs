//! Error taxonomy for socket-backed streams
//!
//! Every fallible operation in this crate returns [`std::io::Result`]. The
//! [`io::ErrorKind`] tells the caller which class of failure occurred:
//!
//! - `InvalidInput`: argument errors (buffer ranges, zero timeouts, bad linger)
//! - `NotConnected`: state errors (stream closed, handle no longer valid)
//! - `Unsupported`: seeking/length mutation, or a socket type that is neither
//!   stream nor datagram
//! - `WriteZero`: the write retry budget ran out with bytes still pending
//! - `TimedOut`: a blocking read hit its deadline with nothing received
//!
//! When more context is available it is attached as a [`SocketError`] payload
//! and can be recovered with [`SocketError::from_io`].

use std::io;

/// Context carried inside [`io::Error`]s produced by this crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    /// The stream was already closed.
    #[error("stream is closed")]
    Closed,

    /// The wrapped socket no longer refers to a valid OS handle.
    #[error("socket handle is no longer valid")]
    InvalidHandle,

    /// `offset`/`count` do not describe a range inside the buffer.
    #[error("range {offset}+{count} is outside a buffer of {len} bytes")]
    OutOfRange {
        offset: usize,
        count: usize,
        len: usize,
    },

    /// The socket reports a transport type other than stream or datagram.
    #[error("unsupported socket type {0}")]
    UnsupportedMode(i32),

    /// Network streams have no position or length.
    #[error("network streams do not support seeking")]
    SeekUnsupported,

    /// The peer address could not be read when the stream was created.
    #[error("socket has no peer (os error {code})")]
    PeerUnavailable { code: i32 },

    /// The transport kept accepting zero bytes until the retry budget ran out.
    #[error("send stalled with {remaining} bytes unsent")]
    WriteStalled { remaining: usize },
}

impl SocketError {
    /// Recovers the payload attached to an error produced by this crate.
    pub fn from_io(err: &io::Error) -> Option<&SocketError> {
        err.get_ref()?.downcast_ref::<SocketError>()
    }
}

pub(crate) fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, SocketError::Closed)
}

pub(crate) fn invalid_handle() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, SocketError::InvalidHandle)
}

pub(crate) fn out_of_range(offset: usize, count: usize, len: usize) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, SocketError::OutOfRange { offset, count, len })
}

pub(crate) fn unsupported_mode(raw: i32) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, SocketError::UnsupportedMode(raw))
}

pub(crate) fn seek_unsupported() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, SocketError::SeekUnsupported)
}

/// Keeps the kind of the native failure but replaces the payload with the code.
pub(crate) fn peer_unavailable(source: &io::Error) -> io::Error {
    let code = source.raw_os_error().unwrap_or(-1);
    io::Error::new(source.kind(), SocketError::PeerUnavailable { code })
}

pub(crate) fn write_stalled(remaining: usize) -> io::Error {
    io::Error::new(io::ErrorKind::WriteZero, SocketError::WriteStalled { remaining })
}

pub(crate) fn invalid_input(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Checks that `offset..offset + count` lies inside a buffer of `len` bytes.
pub(crate) fn check_range(len: usize, offset: usize, count: usize) -> io::Result<()> {
    if offset > len || count > len - offset {
        return Err(out_of_range(offset, count, len));
    }
    Ok(())
}
