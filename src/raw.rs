//! Low-level socket operations and platform abstractions
//!
//! This module is the only place that talks to the operating system. It wraps
//! an already-prepared OS socket handle (connected stream or peer-associated
//! datagram socket) in [`Socket`] and exposes the handful of calls a
//! [`SocketStream`](crate::stream::SocketStream) needs: send/receive in both
//! addressing flavours, the transport-type and peer-address queries, the
//! pending-bytes query, per-direction timeouts, and close.
//!
//! # Platform Support
//!
//! ## Unix Systems (Linux, macOS, BSD, Android)
//! - POSIX calls on file descriptors (`recv`, `sendto`, `getpeername`, ...)
//! - `MSG_NOSIGNAL` on Linux/Android so a reset peer surfaces as `EPIPE`
//!   instead of killing the process
//! - `FIONREAD` for the pending-bytes query
//!
//! ## Windows
//! - WinSock2 calls on `SOCKET` handles with lazy `WSAStartup`
//! - Millisecond `DWORD` timeouts
//!
//! Connecting, binding and address resolution are deliberately absent: the
//! caller prepares the socket (usually through `std::net`) and hands it over.
//!
//! # Safety
//!
//! This module contains `unsafe` code for raw socket system calls and for
//! reinterpreting `sockaddr_storage` as the concrete address family. All of it
//! is encapsulated behind the safe [`Socket`] API.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Transport type reported by the OS for a socket
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// Connection-oriented byte stream (`SOCK_STREAM`)
    Stream,
    /// Connectionless datagrams (`SOCK_DGRAM`)
    Dgram,
    /// Anything else (raw, seqpacket, ...), with the native type code
    Other(i32),
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
        /// Unix socket handle type
        pub type OsSocket = RawFd;
        type AtomicOsSocket = std::sync::atomic::AtomicI32;
        /// Sentinel stored in a [`Socket`] once it has been closed
        pub const INVALID_SOCKET: OsSocket = -1;

        #[cfg(any(target_os = "linux", target_os = "android"))]
        const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        const SEND_FLAGS: libc::c_int = 0;

        fn cvt(rc: isize) -> io::Result<usize> {
            if rc < 0 { Err(io::Error::last_os_error()) } else { Ok(rc as usize) }
        }

        /// Convert SocketAddr to platform-specific socket address storage
        pub fn to_sockaddr(addr: SocketAddr) -> (libc::sockaddr_storage, libc::socklen_t) {
            let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
            let len = match addr {
                SocketAddr::V4(a) => {
                    let s = unsafe { &mut *(&mut storage as *mut _ as *mut libc::sockaddr_in) };
                    s.sin_family = libc::AF_INET as _;
                    s.sin_port = a.port().to_be();
                    s.sin_addr = libc::in_addr { s_addr: u32::from_ne_bytes(a.ip().octets()) };
                    std::mem::size_of::<libc::sockaddr_in>()
                }
                SocketAddr::V6(a) => {
                    let s = unsafe { &mut *(&mut storage as *mut _ as *mut libc::sockaddr_in6) };
                    s.sin6_family = libc::AF_INET6 as _;
                    s.sin6_port = a.port().to_be();
                    s.sin6_flowinfo = a.flowinfo();
                    s.sin6_scope_id = a.scope_id();
                    s.sin6_addr = libc::in6_addr { s6_addr: a.ip().octets() };
                    std::mem::size_of::<libc::sockaddr_in6>()
                }
            };
            (storage, len as libc::socklen_t)
        }

        /// Convert platform-specific socket address storage back to SocketAddr
        pub fn from_sockaddr(storage: &libc::sockaddr_storage) -> io::Result<SocketAddr> {
            match storage.ss_family as libc::c_int {
                libc::AF_INET => {
                    let s = unsafe { &*(storage as *const _ as *const libc::sockaddr_in) };
                    let ip = std::net::Ipv4Addr::from(s.sin_addr.s_addr.to_ne_bytes());
                    Ok(SocketAddr::new(ip.into(), u16::from_be(s.sin_port)))
                }
                libc::AF_INET6 => {
                    let s = unsafe { &*(storage as *const _ as *const libc::sockaddr_in6) };
                    let ip = std::net::Ipv6Addr::from(s.sin6_addr.s6_addr);
                    Ok(SocketAddr::V6(std::net::SocketAddrV6::new(
                        ip,
                        u16::from_be(s.sin6_port),
                        s.sin6_flowinfo,
                        s.sin6_scope_id,
                    )))
                }
                _ => Err(io::Error::new(io::ErrorKind::InvalidInput, "unsupported address family")),
            }
        }

        fn getsockopt_int(fd: RawFd, level: i32, opt: i32) -> io::Result<i32> {
            let mut v: libc::c_int = 0;
            let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
            let rc = unsafe { libc::getsockopt(fd, level, opt, &mut v as *mut _ as _, &mut len) };
            if rc != 0 { Err(io::Error::last_os_error()) } else { Ok(v) }
        }

        /// Query the transport type (`SO_TYPE`)
        pub fn socket_type(os: OsSocket) -> io::Result<Type> {
            Ok(match getsockopt_int(os, libc::SOL_SOCKET, libc::SO_TYPE)? {
                libc::SOCK_STREAM => Type::Stream,
                libc::SOCK_DGRAM => Type::Dgram,
                other => Type::Other(other),
            })
        }

        /// Query the connected/associated peer address
        pub fn peer_addr(os: OsSocket) -> io::Result<SocketAddr> {
            let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
            let rc = unsafe { libc::getpeername(os, &mut storage as *mut _ as *mut libc::sockaddr, &mut len) };
            if rc != 0 { return Err(io::Error::last_os_error()); }
            from_sockaddr(&storage)
        }

        /// Number of bytes queued for immediate retrieval (`FIONREAD`)
        pub fn bytes_available(os: OsSocket) -> io::Result<usize> {
            let mut n: libc::c_int = 0;
            if unsafe { libc::ioctl(os, libc::FIONREAD, &mut n) } != 0 { return Err(io::Error::last_os_error()); }
            Ok(n.max(0) as usize)
        }

        /// Whether the descriptor still refers to an open file
        pub fn is_valid(os: OsSocket) -> bool {
            os >= 0 && unsafe { libc::fcntl(os, libc::F_GETFD) } != -1
        }

        /// Receive on a connected socket
        pub fn recv(os: OsSocket, buf: &mut [u8]) -> io::Result<usize> {
            cvt(unsafe { libc::recv(os, buf.as_mut_ptr() as _, buf.len(), 0) })
        }

        /// Receive one datagram and report its sender
        pub fn recv_from(os: OsSocket, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
            let n = cvt(unsafe {
                libc::recvfrom(os, buf.as_mut_ptr() as _, buf.len(), 0, &mut storage as *mut _ as *mut libc::sockaddr, &mut len)
            })?;
            Ok((n, from_sockaddr(&storage)?))
        }

        /// Send on a connected socket
        pub fn send(os: OsSocket, buf: &[u8]) -> io::Result<usize> {
            cvt(unsafe { libc::send(os, buf.as_ptr() as _, buf.len(), SEND_FLAGS) })
        }

        /// Send one datagram to `addr`
        pub fn send_to(os: OsSocket, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
            let (storage, len) = to_sockaddr(addr);
            cvt(unsafe {
                libc::sendto(os, buf.as_ptr() as _, buf.len(), SEND_FLAGS, &storage as *const _ as *const libc::sockaddr, len)
            })
        }

        fn get_timeout(os: OsSocket, opt: i32) -> io::Result<Option<Duration>> {
            let mut tv: libc::timeval = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<libc::timeval>() as libc::socklen_t;
            let rc = unsafe { libc::getsockopt(os, libc::SOL_SOCKET, opt, &mut tv as *mut _ as _, &mut len) };
            if rc != 0 { return Err(io::Error::last_os_error()); }
            if tv.tv_sec == 0 && tv.tv_usec == 0 { return Ok(None); }
            Ok(Some(Duration::new(tv.tv_sec as u64, (tv.tv_usec as u32) * 1000)))
        }

        fn set_timeout(os: OsSocket, opt: i32, timeout: Option<Duration>) -> io::Result<()> {
            let tv = match timeout {
                Some(d) if d.is_zero() => return Err(zero_timeout()),
                Some(d) => {
                    let secs = d.as_secs().min(libc::time_t::MAX as u64) as libc::time_t;
                    let mut usec = d.subsec_micros() as libc::suseconds_t;
                    // A sub-microsecond timeout must not round down to "infinite".
                    if secs == 0 && usec == 0 { usec = 1; }
                    libc::timeval { tv_sec: secs, tv_usec: usec }
                }
                None => libc::timeval { tv_sec: 0, tv_usec: 0 },
            };
            let rc = unsafe {
                libc::setsockopt(os, libc::SOL_SOCKET, opt, &tv as *const _ as _, std::mem::size_of::<libc::timeval>() as _)
            };
            if rc != 0 { Err(io::Error::last_os_error()) } else { Ok(()) }
        }

        /// Current receive timeout (`None` = block forever)
        pub fn read_timeout(os: OsSocket) -> io::Result<Option<Duration>> { get_timeout(os, libc::SO_RCVTIMEO) }
        /// Set receive timeout (`None` = block forever)
        pub fn set_read_timeout(os: OsSocket, t: Option<Duration>) -> io::Result<()> { set_timeout(os, libc::SO_RCVTIMEO, t) }
        /// Current send timeout (`None` = block forever)
        pub fn write_timeout(os: OsSocket) -> io::Result<Option<Duration>> { get_timeout(os, libc::SO_SNDTIMEO) }
        /// Set send timeout (`None` = block forever)
        pub fn set_write_timeout(os: OsSocket, t: Option<Duration>) -> io::Result<()> { set_timeout(os, libc::SO_SNDTIMEO, t) }

        /// Release the OS handle
        pub fn close_raw(os: OsSocket) -> io::Result<()> {
            if unsafe { libc::close(os) } != 0 { Err(io::Error::last_os_error()) } else { Ok(()) }
        }

        impl AsRawFd for Socket {
            fn as_raw_fd(&self) -> RawFd { self.as_raw() }
        }

        impl From<std::net::TcpStream> for Socket {
            fn from(s: std::net::TcpStream) -> Self { Self::from_os(s.into_raw_fd()) }
        }

        impl From<std::net::UdpSocket> for Socket {
            fn from(s: std::net::UdpSocket) -> Self { Self::from_os(s.into_raw_fd()) }
        }

    } else {
        // Windows
        use std::sync::Once;
        use windows_sys::Win32::Networking::WinSock::*;
        use std::os::windows::io::{AsRawSocket, IntoRawSocket, RawSocket};
        /// Windows socket handle type
        pub type OsSocket = RawSocket; // SOCKET
        type AtomicOsSocket = std::sync::atomic::AtomicU64;
        /// Sentinel stored in a [`Socket`] once it has been closed
        pub const INVALID_SOCKET: OsSocket = windows_sys::Win32::Networking::WinSock::INVALID_SOCKET as OsSocket;

        static START: Once = Once::new();
        fn ensure_wsa() {
            START.call_once(|| unsafe {
                let mut data: WSADATA = std::mem::zeroed();
                let rc = WSAStartup(0x202, &mut data); // MAKEWORD(2,2)
                if rc != 0 { panic!("WSAStartup failed: {}", rc); }
            });
        }

        fn last_error() -> io::Error { io::Error::from_raw_os_error(unsafe { WSAGetLastError() }) }

        fn cvt(rc: i32) -> io::Result<usize> {
            if rc == SOCKET_ERROR { Err(last_error()) } else { Ok(rc as usize) }
        }

        fn clamp_len(len: usize) -> i32 { len.min(i32::MAX as usize) as i32 }

        /// Convert SocketAddr to platform-specific socket address storage
        pub fn to_sockaddr(addr: SocketAddr) -> (SOCKADDR_STORAGE, i32) {
            let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
            let len = match addr {
                SocketAddr::V4(a) => {
                    let s = unsafe { &mut *(&mut storage as *mut _ as *mut SOCKADDR_IN) };
                    s.sin_family = AF_INET;
                    s.sin_port = a.port().to_be();
                    s.sin_addr = IN_ADDR { S_un: IN_ADDR_0 { S_addr: u32::from_ne_bytes(a.ip().octets()) } };
                    std::mem::size_of::<SOCKADDR_IN>()
                }
                SocketAddr::V6(a) => {
                    let s = unsafe { &mut *(&mut storage as *mut _ as *mut SOCKADDR_IN6) };
                    s.sin6_family = AF_INET6;
                    s.sin6_port = a.port().to_be();
                    s.sin6_flowinfo = a.flowinfo();
                    s.Anonymous.sin6_scope_id = a.scope_id();
                    s.sin6_addr = IN6_ADDR { u: IN6_ADDR_0 { Byte: a.ip().octets() } };
                    std::mem::size_of::<SOCKADDR_IN6>()
                }
            };
            (storage, len as i32)
        }

        /// Convert platform-specific socket address storage back to SocketAddr
        pub fn from_sockaddr(storage: &SOCKADDR_STORAGE) -> io::Result<SocketAddr> {
            match storage.ss_family {
                AF_INET => {
                    let s = unsafe { &*(storage as *const _ as *const SOCKADDR_IN) };
                    let raw = unsafe { s.sin_addr.S_un.S_addr };
                    let ip = std::net::Ipv4Addr::from(raw.to_ne_bytes());
                    Ok(SocketAddr::new(ip.into(), u16::from_be(s.sin_port)))
                }
                AF_INET6 => {
                    let s = unsafe { &*(storage as *const _ as *const SOCKADDR_IN6) };
                    let ip = std::net::Ipv6Addr::from(unsafe { s.sin6_addr.u.Byte });
                    let scope = unsafe { s.Anonymous.sin6_scope_id };
                    Ok(SocketAddr::V6(std::net::SocketAddrV6::new(ip, u16::from_be(s.sin6_port), s.sin6_flowinfo, scope)))
                }
                _ => Err(io::Error::new(io::ErrorKind::InvalidInput, "unsupported address family")),
            }
        }

        fn getsockopt_int(os: OsSocket, level: i32, opt: i32) -> io::Result<i32> {
            let mut v: i32 = 0;
            let mut len = std::mem::size_of::<i32>() as i32;
            let rc = unsafe { getsockopt(os as usize, level, opt, &mut v as *mut _ as _, &mut len) };
            if rc != 0 { Err(last_error()) } else { Ok(v) }
        }

        /// Query the transport type (`SO_TYPE`)
        pub fn socket_type(os: OsSocket) -> io::Result<Type> {
            ensure_wsa();
            let v = getsockopt_int(os, SOL_SOCKET as _, SO_TYPE as _)?;
            Ok(if v == SOCK_STREAM as i32 { Type::Stream } else if v == SOCK_DGRAM as i32 { Type::Dgram } else { Type::Other(v) })
        }

        /// Query the connected/associated peer address
        pub fn peer_addr(os: OsSocket) -> io::Result<SocketAddr> {
            ensure_wsa();
            let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<SOCKADDR_STORAGE>() as i32;
            let rc = unsafe { getpeername(os as usize, &mut storage as *mut _ as *mut SOCKADDR, &mut len) };
            if rc != 0 { return Err(last_error()); }
            from_sockaddr(&storage)
        }

        /// Number of bytes queued for immediate retrieval (`FIONREAD`)
        pub fn bytes_available(os: OsSocket) -> io::Result<usize> {
            let mut n: u32 = 0;
            if unsafe { ioctlsocket(os as usize, FIONREAD, &mut n) } != 0 { return Err(last_error()); }
            Ok(n as usize)
        }

        /// Whether the handle still refers to an open socket
        pub fn is_valid(os: OsSocket) -> bool {
            os != INVALID_SOCKET && getsockopt_int(os, SOL_SOCKET as _, SO_TYPE as _).is_ok()
        }

        /// Receive on a connected socket
        pub fn recv(os: OsSocket, buf: &mut [u8]) -> io::Result<usize> {
            cvt(unsafe { windows_sys::Win32::Networking::WinSock::recv(os as usize, buf.as_mut_ptr(), clamp_len(buf.len()), 0) })
        }

        /// Receive one datagram and report its sender
        pub fn recv_from(os: OsSocket, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<SOCKADDR_STORAGE>() as i32;
            let n = cvt(unsafe {
                recvfrom(os as usize, buf.as_mut_ptr(), clamp_len(buf.len()), 0, &mut storage as *mut _ as *mut SOCKADDR, &mut len)
            })?;
            Ok((n, from_sockaddr(&storage)?))
        }

        /// Send on a connected socket
        pub fn send(os: OsSocket, buf: &[u8]) -> io::Result<usize> {
            cvt(unsafe { windows_sys::Win32::Networking::WinSock::send(os as usize, buf.as_ptr(), clamp_len(buf.len()), 0) })
        }

        /// Send one datagram to `addr`
        pub fn send_to(os: OsSocket, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
            let (storage, len) = to_sockaddr(addr);
            cvt(unsafe { sendto(os as usize, buf.as_ptr(), clamp_len(buf.len()), 0, &storage as *const _ as *const SOCKADDR, len) })
        }

        fn get_timeout(os: OsSocket, opt: i32) -> io::Result<Option<Duration>> {
            let ms = getsockopt_int(os, SOL_SOCKET as _, opt)? as u32;
            Ok(if ms == 0 { None } else { Some(Duration::from_millis(ms as u64)) })
        }

        fn set_timeout(os: OsSocket, opt: i32, timeout: Option<Duration>) -> io::Result<()> {
            let ms: u32 = match timeout {
                Some(d) if d.is_zero() => return Err(zero_timeout()),
                Some(d) => d.as_millis().clamp(1, u32::MAX as u128) as u32,
                None => 0,
            };
            let rc = unsafe { setsockopt(os as usize, SOL_SOCKET as _, opt, &ms as *const _ as _, std::mem::size_of::<u32>() as _) };
            if rc != 0 { Err(last_error()) } else { Ok(()) }
        }

        /// Current receive timeout (`None` = block forever)
        pub fn read_timeout(os: OsSocket) -> io::Result<Option<Duration>> { get_timeout(os, SO_RCVTIMEO as _) }
        /// Set receive timeout (`None` = block forever)
        pub fn set_read_timeout(os: OsSocket, t: Option<Duration>) -> io::Result<()> { set_timeout(os, SO_RCVTIMEO as _, t) }
        /// Current send timeout (`None` = block forever)
        pub fn write_timeout(os: OsSocket) -> io::Result<Option<Duration>> { get_timeout(os, SO_SNDTIMEO as _) }
        /// Set send timeout (`None` = block forever)
        pub fn set_write_timeout(os: OsSocket, t: Option<Duration>) -> io::Result<()> { set_timeout(os, SO_SNDTIMEO as _, t) }

        /// Release the OS handle
        pub fn close_raw(os: OsSocket) -> io::Result<()> {
            if unsafe { closesocket(os as usize) } != 0 { Err(last_error()) } else { Ok(()) }
        }

        impl AsRawSocket for Socket {
            fn as_raw_socket(&self) -> RawSocket { self.as_raw() }
        }

        impl From<std::net::TcpStream> for Socket {
            fn from(s: std::net::TcpStream) -> Self { Self::from_os(s.into_raw_socket()) }
        }

        impl From<std::net::UdpSocket> for Socket {
            fn from(s: std::net::UdpSocket) -> Self { Self::from_os(s.into_raw_socket()) }
        }
    }
}

fn zero_timeout() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "cannot set a zero duration timeout")
}

/// An owned OS socket handle
///
/// The handle is closed by [`Socket::close`] or on drop, whichever comes
/// first. Closing is idempotent: the stored handle is swapped for
/// [`INVALID_SOCKET`], so later calls see a closed socket instead of acting on
/// a recycled descriptor.
///
/// Share one `Socket` between several users through `&Socket` or
/// `Arc<Socket>`; those forms implement [`Transport`](crate::Transport) too.
///
/// # Closing from another thread
///
/// `close` may run while another thread is blocked in `recv` or `send` on a
/// shared socket. On unix the blocked call is not woken: the kernel keeps the
/// old socket alive for it, and it returns when its own timeout expires or
/// data arrives on that same socket. On Windows `closesocket` aborts it with
/// an error. Calls that start after the close fail with `NotConnected`.
///
/// A call that loaded the handle just before the close, but reached the
/// kernel after it, can land on a recycled descriptor. Give shared sockets a
/// read timeout, and prefer closing them once no call is in flight.
#[derive(Debug)]
pub struct Socket {
    os: AtomicOsSocket,
}

impl Socket {
    fn from_os(os: OsSocket) -> Self {
        Self { os: AtomicOsSocket::new(os) }
    }

    /// Takes ownership of a raw OS handle.
    ///
    /// # Safety
    ///
    /// `os` must be an open socket that nothing else will close.
    pub unsafe fn from_raw(os: OsSocket) -> Self {
        Self::from_os(os)
    }

    /// The raw handle, or [`INVALID_SOCKET`] after close.
    pub fn as_raw(&self) -> OsSocket {
        self.os.load(Ordering::Acquire)
    }

    fn handle(&self) -> io::Result<OsSocket> {
        match self.as_raw() {
            INVALID_SOCKET => Err(crate::error::invalid_handle()),
            os => Ok(os),
        }
    }

    pub fn socket_type(&self) -> io::Result<Type> {
        socket_type(self.handle()?)
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        peer_addr(self.handle()?)
    }

    pub fn bytes_available(&self) -> io::Result<usize> {
        bytes_available(self.handle()?)
    }

    pub fn is_valid(&self) -> bool {
        is_valid(self.as_raw())
    }

    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        recv(self.handle()?, buf)
    }

    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        recv_from(self.handle()?, buf)
    }

    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        send(self.handle()?, buf)
    }

    pub fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        send_to(self.handle()?, buf, addr)
    }

    pub fn read_timeout(&self) -> io::Result<Option<Duration>> {
        read_timeout(self.handle()?)
    }

    pub fn set_read_timeout(&self, t: Option<Duration>) -> io::Result<()> {
        set_read_timeout(self.handle()?, t)
    }

    pub fn write_timeout(&self) -> io::Result<Option<Duration>> {
        write_timeout(self.handle()?)
    }

    pub fn set_write_timeout(&self, t: Option<Duration>) -> io::Result<()> {
        set_write_timeout(self.handle()?, t)
    }

    /// Closes the handle. Calling it again is a no-op.
    pub fn close(&self) -> io::Result<()> {
        let os = self.os.swap(INVALID_SOCKET, Ordering::AcqRel);
        if os == INVALID_SOCKET {
            return Ok(());
        }
        log::trace!("closing socket handle {}", os);
        close_raw(os)
    }

    /// Detaches the raw handle without closing it.
    ///
    /// The caller becomes responsible for closing it. Returns
    /// [`INVALID_SOCKET`] if the socket was already closed.
    pub fn into_raw(self) -> OsSocket {
        self.os.swap(INVALID_SOCKET, Ordering::AcqRel)
    }

    /// Whether [`Socket::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.as_raw() == INVALID_SOCKET
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close socket on drop: {}", e);
        }
    }
}
