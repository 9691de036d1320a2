use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, WireError};

/// A connected duplex stream to the device server.
///
/// Wraps a TCP stream with Nagle disabled; pixel pushes are
/// latency-sensitive. Clone it to split reading and writing across
/// threads.
pub struct WireStream {
    inner: TcpStream,
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl WireStream {
    /// Connect to a listening device server (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let stream = TcpStream::connect(&addr).map_err(|source| WireError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        debug!(%addr, "connected to device server");
        Self::from_tcp(stream)
    }

    fn from_tcp(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self { inner: stream })
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self { inner: cloned })
    }

    /// Shut down both directions of the stream.
    ///
    /// Unblocks any thread waiting in a read on a clone of this stream.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.shutdown(Shutdown::Both).map_err(Into::into)
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }
}

impl std::fmt::Debug for WireStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireStream")
            .field("peer", &self.inner.peer_addr().ok())
            .finish()
    }
}

/// Listening endpoint, used by tests and local tooling to stand in for
/// the device server.
pub struct ServerEndpoint {
    listener: TcpListener,
}

impl ServerEndpoint {
    /// Bind and listen on a TCP address.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let listener = TcpListener::bind(&addr).map_err(|source| WireError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        info!(%addr, "listening");
        Ok(Self { listener })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        let (stream, addr) = self.listener.accept().map_err(WireError::Accept)?;
        debug!(%addr, "accepted connection");
        WireStream::from_tcp(stream)
    }

    /// The local address this endpoint is bound to.
    ///
    /// Useful after binding port 0 to discover the assigned port.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::reader::LineReader;
    use crate::writer::LineWriter;

    #[test]
    fn bind_accept_connect_roundtrip() {
        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap();

        let client = thread::spawn(move || {
            let stream = WireStream::connect(addr).unwrap();
            let mut writer = LineWriter::new(stream);
            writer.send(b"hello").unwrap();
        });

        let stream = endpoint.accept().unwrap();
        let mut reader = LineReader::new(stream);
        let frame = reader.read_line().unwrap();
        assert_eq!(frame.as_ref(), b"hello");

        client.join().unwrap();
    }

    #[test]
    fn cloned_stream_halves_are_independent() {
        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap();

        let server = thread::spawn(move || {
            let stream = endpoint.accept().unwrap();
            let mut reader = LineReader::new(stream.try_clone().unwrap());
            let mut writer = LineWriter::new(stream);
            let frame = reader.read_line().unwrap();
            writer.send(frame.as_ref()).unwrap();
        });

        let stream = WireStream::connect(addr).unwrap();
        let mut reader = LineReader::new(stream.try_clone().unwrap());
        let mut writer = LineWriter::new(stream);
        writer.send(b"echo me").unwrap();
        assert_eq!(reader.read_line().unwrap().as_ref(), b"echo me");

        server.join().unwrap();
    }

    #[test]
    fn shutdown_unblocks_reader() {
        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap();

        let stream = WireStream::connect(addr).unwrap();
        let read_half = stream.try_clone().unwrap();
        let _server_side = endpoint.accept().unwrap();

        let reader_thread = thread::spawn(move || {
            let mut reader = LineReader::new(read_half);
            reader.read_line()
        });

        stream.shutdown().unwrap();
        let result = reader_thread.join().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn config_read_timeout_bounds_blocking_reads() {
        use crate::codec::WireConfig;
        use std::time::Duration;

        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap();

        let stream = WireStream::connect(addr).unwrap();
        let _server_side = endpoint.accept().unwrap();

        let config = WireConfig {
            read_timeout: Some(Duration::from_millis(50)),
            write_timeout: Some(Duration::from_secs(1)),
            ..WireConfig::default()
        };
        let mut writer =
            LineWriter::with_config_stream(stream.try_clone().unwrap(), config.clone()).unwrap();
        let mut reader = LineReader::with_config_stream(stream, config).unwrap();

        writer.send(b"ping").unwrap();

        // Nothing inbound, so the read times out instead of blocking.
        match reader.read_line() {
            Err(crate::error::WireError::Io(err)) => {
                assert!(matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ));
            }
            other => panic!("expected timed-out read, got {other:?}"),
        }
    }

    #[test]
    fn connect_refused_reports_address() {
        // Bind then drop to get a port that is very likely unused.
        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap();
        drop(endpoint);

        let result = WireStream::connect(addr);
        match result {
            Err(WireError::Connect { addr: reported, .. }) => {
                assert_eq!(reported, addr.to_string());
            }
            other => panic!("expected Connect error, got {other:?}"),
        }
    }
}
