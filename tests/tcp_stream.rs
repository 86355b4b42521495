use horizon_socket_stream::raw::Socket;
use horizon_socket_stream::{SocketMode, SocketStream, StreamBuilder};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Connects a client to a fresh loopback listener and returns both ends.
fn connected_pair() -> anyhow::Result<(TcpStream, TcpStream)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let client = TcpStream::connect(listener.local_addr()?)?;
    let (server, _) = listener.accept()?;
    Ok((client, server))
}

#[test]
fn echo_round_trip() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let echo = thread::spawn(move || -> std::io::Result<()> {
        let mut buf = [0u8; 13];
        server.read_exact(&mut buf)?;
        server.write_all(&buf)
    });

    let mut stream = StreamBuilder::new()
        .owns_socket(true)
        .read_timeout(Duration::from_secs(5))?
        .tcp(client)?;
    assert_eq!(stream.mode(), SocketMode::Stream);

    stream.write_all(b"hello horizon")?;
    let mut reply = [0u8; 13];
    stream.read_exact(&mut reply)?;
    assert_eq!(&reply, b"hello horizon");

    echo.join().expect("echo thread panicked")?;
    stream.close()?;
    Ok(())
}

#[test]
fn large_write_is_delivered_in_full() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let payload: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut received = Vec::new();
        server.read_to_end(&mut received)?;
        Ok(received)
    });

    let mut stream = SocketStream::with_ownership(Socket::from(client), true)?;
    stream.write_from(&payload, 0, payload.len())?;
    stream.close()?;

    let received = reader.join().expect("reader thread panicked")?;
    assert_eq!(received.len(), expected.len());
    assert!(received == expected);
    Ok(())
}

#[test]
fn orderly_shutdown_reads_zero() -> anyhow::Result<()> {
    init_logging();
    let (client, server) = connected_pair()?;
    drop(server);

    let mut stream = StreamBuilder::new()
        .owns_socket(true)
        .read_timeout(Duration::from_secs(5))?
        .tcp(client)?;
    let mut buf = [0u8; 8];
    assert_eq!(stream.read(&mut buf)?, 0);
    Ok(())
}

#[test]
fn read_respects_timeout() -> anyhow::Result<()> {
    init_logging();
    let (client, _server) = connected_pair()?;
    let mut stream = SocketStream::with_ownership(Socket::from(client), true)?;
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;

    let start = Instant::now();
    let mut buf = [0u8; 8];
    let err = stream.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimedOut);
    assert!(start.elapsed() >= Duration::from_millis(900));
    Ok(())
}

#[test]
fn read_returns_only_what_is_queued() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let mut stream = SocketStream::with_ownership(Socket::from(client), true)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;

    server.write_all(b"abc")?;
    let deadline = Instant::now() + Duration::from_secs(5);
    while !stream.data_available()? {
        assert!(Instant::now() < deadline, "data never arrived");
        thread::sleep(Duration::from_millis(5));
    }

    let mut buf = [0u8; 32];
    let n = stream.read_into(&mut buf, 4, 20)?;
    assert_eq!(n, 3);
    assert_eq!(&buf[4..7], b"abc");
    Ok(())
}

#[test]
fn borrowed_socket_survives_stream() -> anyhow::Result<()> {
    init_logging();
    let (client, _server) = connected_pair()?;
    let socket = Socket::from(client);

    {
        let mut stream = SocketStream::new(&socket)?;
        assert!(!stream.owns_socket());
        stream.close()?;
    }
    assert!(socket.is_valid());

    let mut owner = SocketStream::with_ownership(&socket, true)?;
    owner.close()?;
    assert!(socket.is_closed());
    Ok(())
}

#[test]
fn shared_socket_outlives_non_owning_streams() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let socket = Arc::new(Socket::from(client));

    let mut writer = SocketStream::new(Arc::clone(&socket))?;
    writer.write_all(b"one")?;
    drop(writer);

    let mut writer = SocketStream::new(Arc::clone(&socket))?;
    writer.write_all(b"two")?;
    drop(writer);

    let mut buf = [0u8; 6];
    server.read_exact(&mut buf)?;
    assert_eq!(&buf, b"onetwo");
    assert!(socket.is_valid());
    Ok(())
}

#[test]
fn final_write_then_linger_close() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let mut stream = SocketStream::with_ownership(Socket::from(client), true)?;

    assert!(stream.try_write_final(b"--trailer--", 2, 7));
    let start = Instant::now();
    stream.close_with_linger(100)?;
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(!stream.try_write_final(b"late", 0, 4));

    let mut received = Vec::new();
    server.read_to_end(&mut received)?;
    assert_eq!(received, b"trailer");
    Ok(())
}

#[test]
fn into_inner_returns_usable_socket() -> anyhow::Result<()> {
    init_logging();
    let (client, mut server) = connected_pair()?;
    let mut stream = StreamBuilder::new().owns_socket(true).tcp(client)?;
    stream.write_all(b"first")?;

    let socket = stream.into_inner();
    assert!(socket.is_valid());
    let mut stream = SocketStream::with_ownership(socket, true)?;
    stream.write_all(b"second")?;
    stream.close()?;

    let mut received = Vec::new();
    server.read_to_end(&mut received)?;
    assert_eq!(received, b"firstsecond");
    Ok(())
}
