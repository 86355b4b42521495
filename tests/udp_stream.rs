use horizon_socket_stream::raw::Socket;
use horizon_socket_stream::{SocketError, SocketMode, SocketStream, StreamBuilder};
use std::io::{ErrorKind, Read, Write};
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A local socket connected to `remote`, plus `remote` itself.
fn associated_pair() -> anyhow::Result<(UdpSocket, UdpSocket)> {
    let remote = UdpSocket::bind("127.0.0.1:0")?;
    let local = UdpSocket::bind("127.0.0.1:0")?;
    local.connect(remote.local_addr()?)?;
    remote.set_read_timeout(Some(Duration::from_secs(5)))?;
    Ok((local, remote))
}

#[test]
fn datagram_exchange() -> anyhow::Result<()> {
    init_logging();
    let (local, remote) = associated_pair()?;
    let local_addr = local.local_addr()?;

    let mut stream = StreamBuilder::new()
        .owns_socket(true)
        .read_timeout(Duration::from_secs(5))?
        .udp(local)?;
    assert_eq!(stream.mode(), SocketMode::Datagram);
    assert_eq!(stream.peer_addr(), remote.local_addr()?);

    stream.write_all(b"ping")?;
    let mut buf = [0u8; 16];
    let (n, from) = remote.recv_from(&mut buf)?;
    assert_eq!(&buf[..n], b"ping");
    assert_eq!(from, local_addr);

    remote.send_to(b"pong", local_addr)?;
    let n = stream.read(&mut buf)?;
    assert_eq!(&buf[..n], b"pong");
    assert_eq!(stream.peer_addr(), remote.local_addr()?);
    Ok(())
}

#[test]
fn read_never_exceeds_max_count() -> anyhow::Result<()> {
    init_logging();
    let (local, remote) = associated_pair()?;
    let local_addr = local.local_addr()?;
    let mut stream = StreamBuilder::new()
        .owns_socket(true)
        .read_timeout(Duration::from_secs(5))?
        .udp(local)?;

    remote.send_to(b"0123456789", local_addr)?;
    let mut buf = [0u8; 10];
    let n = stream.read_into(&mut buf, 0, 4)?;
    assert!(n <= 4);
    assert_eq!(&buf[..n], &b"0123"[..n]);
    Ok(())
}

#[test]
fn unassociated_socket_is_rejected() -> anyhow::Result<()> {
    init_logging();
    let lonely = UdpSocket::bind("127.0.0.1:0")?;
    let err = SocketStream::new(Socket::from(lonely)).unwrap_err();
    match SocketError::from_io(&err) {
        Some(SocketError::PeerUnavailable { code }) => assert_ne!(*code, 0),
        other => panic!("unexpected error payload: {:?}", other),
    }
    Ok(())
}

#[test]
fn idle_read_times_out() -> anyhow::Result<()> {
    init_logging();
    let (local, _remote) = associated_pair()?;
    let mut stream = StreamBuilder::new()
        .owns_socket(true)
        .read_timeout(Duration::from_secs(1))?
        .udp(local)?;

    let mut buf = [0u8; 8];
    assert_eq!(stream.read(&mut buf).unwrap_err().kind(), ErrorKind::TimedOut);
    Ok(())
}

#[test]
fn owned_socket_closed_on_drop() -> anyhow::Result<()> {
    init_logging();
    let (local, _remote) = associated_pair()?;
    let socket = Arc::new(Socket::from(local));

    drop(SocketStream::new(Arc::clone(&socket))?);
    assert!(socket.is_valid());

    drop(SocketStream::with_ownership(Arc::clone(&socket), true)?);
    assert!(socket.is_closed());
    Ok(())
}

#[test]
fn non_owning_stream_leaves_socket_open_on_drop() -> anyhow::Result<()> {
    init_logging();
    let (local, remote) = associated_pair()?;
    let socket = Socket::from(local);
    let handle = socket.as_raw();

    let stream = SocketStream::new(socket)?;
    assert!(!stream.owns_socket());
    drop(stream);

    // Still the same associated socket, not a recycled handle.
    let socket = unsafe { Socket::from_raw(handle) };
    assert!(socket.is_valid());
    let mut stream = SocketStream::with_ownership(socket, true)?;
    assert_eq!(stream.peer_addr(), remote.local_addr()?);

    stream.write_all(b"still here")?;
    let mut buf = [0u8; 16];
    let (n, _) = remote.recv_from(&mut buf)?;
    assert_eq!(&buf[..n], b"still here");
    Ok(())
}

#[test]
fn boxed_socket_follows_ownership_flag() -> anyhow::Result<()> {
    init_logging();
    let (local, _remote) = associated_pair()?;
    let socket = Box::new(Socket::from(local));
    let handle = socket.as_raw();

    drop(SocketStream::new(socket)?);
    let socket = Box::new(unsafe { Socket::from_raw(handle) });
    assert!(socket.is_valid());

    let stream = SocketStream::with_ownership(socket, true)?;
    let socket = stream.into_inner();
    assert!(socket.is_valid());
    Ok(())
}

#[test]
fn close_from_another_thread_ends_blocked_read() -> anyhow::Result<()> {
    init_logging();
    let (local, _remote) = associated_pair()?;
    let socket = Arc::new(Socket::from(local));
    let mut stream = SocketStream::new(Arc::clone(&socket))?;
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;

    let closer = {
        let socket = Arc::clone(&socket);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            socket.close()
        })
    };

    let start = Instant::now();
    let mut buf = [0u8; 8];
    let res = stream.read(&mut buf);
    closer.join().expect("closer thread panicked")?;

    // Nothing was ever sent, so any data would have come from a reused handle.
    assert!(res.is_err(), "read returned {:?} after a concurrent close", res);
    assert!(start.elapsed() < Duration::from_secs(3));

    let err = stream.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConnected);
    assert_eq!(SocketError::from_io(&err), Some(&SocketError::InvalidHandle));
    Ok(())
}
