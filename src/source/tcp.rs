//! TCP transport for live device streams.
//!
//! Serial-to-network bridges (ser2net, socat) expose the helmet's serial
//! port as a TCP endpoint. The stream runs in non-blocking mode: each poll
//! drains whatever bytes are ready into a line buffer and reports whether a
//! complete line has accumulated.

use std::io::{ErrorKind, Read};
use std::net::{Shutdown, TcpStream};

use super::Transport;
use crate::error::MonitorError;

/// A transport reading newline-delimited readings from a TCP stream.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    buffer: Vec<u8>,
    description: String,
}

impl TcpTransport {
    /// Connect to `addr` and switch the stream to non-blocking mode.
    ///
    /// Failure is reported as [`MonitorError::Connection`], never a panic;
    /// the caller decides whether to retry or give up.
    pub fn connect(addr: &str) -> Result<Self, MonitorError> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| MonitorError::Connection(format!("failed to connect to {addr}: {e}")))?;
        stream.set_nonblocking(true).map_err(|e| {
            MonitorError::Connection(format!("failed to set {addr} non-blocking: {e}"))
        })?;

        Ok(Self {
            stream: Some(stream),
            buffer: Vec::new(),
            description: format!("tcp: {addr}"),
        })
    }

    /// Drain whatever bytes are ready into the line buffer.
    ///
    /// EOF and hard I/O errors drop the stream, after which
    /// [`is_open`](Transport::is_open) reports false.
    fn fill_buffer(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let mut chunk = [0u8; 1024];
        let mut closed = false;
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => {
                    // Peer closed the connection
                    closed = true;
                    break;
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => {
                    closed = true;
                    break;
                }
            }
        }

        if closed {
            self.stream = None;
        }
    }

    fn line_end(&self) -> Option<usize> {
        self.buffer.iter().position(|&b| b == b'\n')
    }
}

impl Transport for TcpTransport {
    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn has_data(&mut self) -> bool {
        self.fill_buffer();
        self.line_end().is_some()
    }

    fn read_line(&mut self) -> Result<String, MonitorError> {
        self.fill_buffer();
        let Some(end) = self.line_end() else {
            return Err(MonitorError::Connection(
                "no complete line available".to_string(),
            ));
        };

        let raw: Vec<u8> = self.buffer.drain(..=end).collect();
        Ok(String::from_utf8_lossy(&raw).trim_end().to_string())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::time::Duration;

    /// Poll `has_data` until it reports a line or the deadline passes.
    fn wait_for_data(transport: &mut TcpTransport) -> bool {
        for _ in 0..100 {
            if transport.has_data() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_connect_and_read_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&addr).unwrap();
        assert!(transport.is_open());
        assert_eq!(transport.description(), format!("tcp: {addr}"));

        let (mut peer, _) = listener.accept().unwrap();
        peer.write_all(b"CO: 100, WORN: 1\nCO: 200, WORN: 0\n").unwrap();
        peer.flush().unwrap();

        assert!(wait_for_data(&mut transport));
        assert_eq!(transport.read_line().unwrap(), "CO: 100, WORN: 1");
        assert_eq!(transport.read_line().unwrap(), "CO: 200, WORN: 0");

        // Nothing more buffered: read must fail rather than block.
        assert!(transport.read_line().is_err());
    }

    #[test]
    fn test_partial_line_is_not_data() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&addr).unwrap();
        let (mut peer, _) = listener.accept().unwrap();

        peer.write_all(b"CO: 10").unwrap();
        peer.flush().unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(!transport.has_data());

        peer.write_all(b"0, WORN: 1\n").unwrap();
        peer.flush().unwrap();
        assert!(wait_for_data(&mut transport));
        assert_eq!(transport.read_line().unwrap(), "CO: 100, WORN: 1");
    }

    #[test]
    fn test_peer_close_marks_transport_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&addr).unwrap();
        let (peer, _) = listener.accept().unwrap();
        drop(peer);

        // Polling after EOF notices the closed stream.
        for _ in 0..100 {
            transport.has_data();
            if !transport.is_open() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!transport.is_open());
    }

    #[test]
    fn test_connect_refused_is_reported() {
        // Bind to grab a free port, then drop the listener before connecting.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = TcpTransport::connect(&addr);
        assert!(matches!(result, Err(MonitorError::Connection(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&addr).unwrap();
        transport.close();
        assert!(!transport.is_open());
        transport.close();
        assert!(!transport.is_open());
    }
}
