//! Echo client: sends one message and reads back the echo.
//!
//! Mirrors the server's one-shot contract: one write, one read, done.
//! The reply is whatever a single read returns, up to the buffer bound.

use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info};

/// Maximum number of bytes taken in the single reply read.
const MAX_REPLY_SIZE: usize = 1024;

/// Resolve `host`, connect, send `message` once, and return the echoed
/// reply.
///
/// The message is sent newline-terminated (a newline is appended if the
/// message lacks one). All failures here are fatal to the client binary:
/// no retry, no backoff, no timeout beyond the OS default.
pub async fn fetch_echo(host: &str, port: u16, message: &str) -> Result<Bytes, ClientError> {
    let addr = resolve(host, port).await?;
    debug!(host, %addr, "resolved target");

    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ClientError::Connect(addr, e))?;
    info!(%addr, "connected to server");

    let mut payload = BytesMut::with_capacity(message.len() + 1);
    payload.extend_from_slice(message.as_bytes());
    if !message.ends_with('\n') {
        payload.extend_from_slice(b"\n");
    }

    stream.write_all(&payload).await.map_err(ClientError::Io)?;
    info!(bytes = payload.len(), "sent message");

    let mut reply = BytesMut::with_capacity(MAX_REPLY_SIZE);
    let received = stream.read_buf(&mut reply).await.map_err(ClientError::Io)?;
    info!(bytes = received, "received echo");

    Ok(reply.freeze())
}

/// Resolve a hostname to its first address.
async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ClientError> {
    let mut addrs = lookup_host((host, port))
        .await
        .map_err(|e| ClientError::Resolve(host.to_string(), e))?;

    addrs.next().ok_or_else(|| {
        ClientError::Resolve(
            host.to_string(),
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ),
        )
    })
}

/// Client-side errors. All of these are fatal to the client binary.
#[derive(Debug)]
pub enum ClientError {
    /// Hostname resolution failed or produced no addresses.
    Resolve(String, std::io::Error),
    /// The connection could not be established.
    Connect(SocketAddr, std::io::Error),
    /// Sending the message or reading the echo failed.
    Io(std::io::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Resolve(host, e) => {
                write!(f, "Failed to resolve host '{}': {}", host, e)
            }
            ClientError::Connect(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            ClientError::Io(e) => {
                write!(f, "Connection I/O failed: {}", e)
            }
        }
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot echo peer: accepts a single connection, echoes one read.
    async fn spawn_one_shot_echo() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buffer = [0u8; 1024];
            let n = stream.read(&mut buffer).await.unwrap();
            stream.write_all(&buffer[..n]).await.unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn round_trips_one_message() {
        let addr = spawn_one_shot_echo().await;

        let reply = fetch_echo(&addr.ip().to_string(), addr.port(), "ping")
            .await
            .unwrap();
        assert_eq!(&reply[..], b"ping\n");
    }

    #[tokio::test]
    async fn does_not_double_terminate() {
        let addr = spawn_one_shot_echo().await;

        let reply = fetch_echo(&addr.ip().to_string(), addr.port(), "ping\n")
            .await
            .unwrap();
        assert_eq!(&reply[..], b"ping\n");
    }

    #[tokio::test]
    async fn connect_failure_is_fatal() {
        // Nothing listens on port 1; the connection must be refused.
        let err = fetch_echo("127.0.0.1", 1, "ping").await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_, _)));
    }

    #[tokio::test]
    async fn unresolvable_host_is_fatal() {
        let err = fetch_echo("no-such-host.invalid", 9000, "ping")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Resolve(_, _)));
    }
}
