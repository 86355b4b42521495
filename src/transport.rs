//! The socket primitive a stream is built on
//!
//! [`Transport`] is the full contract a [`SocketStream`](crate::SocketStream)
//! relies on. [`raw::Socket`](crate::raw::Socket) implements it over an OS
//! handle; tests implement it over scripted in-memory state.
//!
//! All calls are blocking, bounded by the socket's own timeouts. A call that
//! hits its deadline reports `WouldBlock` or `TimedOut`.

use crate::raw::{self, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Operations a stream needs from the underlying socket
pub trait Transport {
    /// Transport type, read once when a stream is created.
    fn socket_type(&self) -> io::Result<Type>;
    /// Connected (stream) or associated (datagram) peer.
    fn peer_addr(&self) -> io::Result<SocketAddr>;
    /// Bytes queued for retrieval without blocking.
    fn available(&self) -> io::Result<usize>;
    /// Whether the handle still refers to a live socket.
    fn is_valid(&self) -> bool;

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
    fn send(&self, buf: &[u8]) -> io::Result<usize>;
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;

    fn read_timeout(&self) -> io::Result<Option<Duration>>;
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
    fn write_timeout(&self) -> io::Result<Option<Duration>>;
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Releases the socket.
    fn close(&self) -> io::Result<()>;

    /// Gives up this handle without closing the socket behind it.
    ///
    /// A stream that does not own its socket calls this instead of dropping
    /// the socket. The default drops `self`, which suits borrowed and shared
    /// handles; a type that closes itself on drop overrides it.
    fn release(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

impl Transport for raw::Socket {
    fn socket_type(&self) -> io::Result<Type> {
        raw::Socket::socket_type(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        raw::Socket::peer_addr(self)
    }

    fn available(&self) -> io::Result<usize> {
        self.bytes_available()
    }

    fn is_valid(&self) -> bool {
        raw::Socket::is_valid(self)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        raw::Socket::recv(self, buf)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        raw::Socket::recv_from(self, buf)
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        raw::Socket::send(self, buf)
    }

    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        raw::Socket::send_to(self, buf, addr)
    }

    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        raw::Socket::read_timeout(self)
    }

    fn set_read_timeout(&self, t: Option<Duration>) -> io::Result<()> {
        raw::Socket::set_read_timeout(self, t)
    }

    fn write_timeout(&self) -> io::Result<Option<Duration>> {
        raw::Socket::write_timeout(self)
    }

    fn set_write_timeout(&self, t: Option<Duration>) -> io::Result<()> {
        raw::Socket::set_write_timeout(self, t)
    }

    fn close(&self) -> io::Result<()> {
        raw::Socket::close(self)
    }

    fn release(self) {
        // Detached handle stays open; the emptied `Socket` drops as a no-op.
        let _ = self.into_raw();
    }
}

macro_rules! forward_transport {
    (@methods) => {
        fn socket_type(&self) -> io::Result<Type> {
            (**self).socket_type()
        }

        fn peer_addr(&self) -> io::Result<SocketAddr> {
            (**self).peer_addr()
        }

        fn available(&self) -> io::Result<usize> {
            (**self).available()
        }

        fn is_valid(&self) -> bool {
            (**self).is_valid()
        }

        fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
            (**self).recv(buf)
        }

        fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            (**self).recv_from(buf)
        }

        fn send(&self, buf: &[u8]) -> io::Result<usize> {
            (**self).send(buf)
        }

        fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
            (**self).send_to(buf, addr)
        }

        fn read_timeout(&self) -> io::Result<Option<Duration>> {
            (**self).read_timeout()
        }

        fn set_read_timeout(&self, t: Option<Duration>) -> io::Result<()> {
            (**self).set_read_timeout(t)
        }

        fn write_timeout(&self) -> io::Result<Option<Duration>> {
            (**self).write_timeout()
        }

        fn set_write_timeout(&self, t: Option<Duration>) -> io::Result<()> {
            (**self).set_write_timeout(t)
        }

        fn close(&self) -> io::Result<()> {
            (**self).close()
        }
    };
    ($($ptr:ty),*) => {$(
        impl<T: Transport + ?Sized> Transport for $ptr {
            forward_transport!(@methods);
        }
    )*};
}

// Borrowed and shared handles: dropping one leaves the socket to its other holders.
forward_transport!(&T, Arc<T>);

// A box owns its socket outright, so releasing it releases the socket inside.
impl<T: Transport> Transport for Box<T> {
    forward_transport!(@methods);

    fn release(self) {
        (*self).release()
    }
}
