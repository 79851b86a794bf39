//! TCP echo server: listener and per-connection handler.
//!
//! Accepts connections in an unbounded loop and spawns one task per
//! connection. Each handler performs exactly one read and, if any bytes
//! arrived, one write of the same bytes, then closes the connection.
//! There is no request-response loop and no delimiter: one read is one
//! message.

use crate::config::Config;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Maximum number of bytes moved by a single read or write call.
const MAX_MESSAGE_SIZE: usize = 1024;

/// Accept backlog for the listening socket.
const LISTEN_BACKLOG: i32 = 1024;

/// Server instance owning the listening socket.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// SO_REUSEADDR is set before binding so a restarted server can rebind
    /// a port whose previous connections are still in TIME_WAIT. Any failure
    /// here (socket creation, bind, listen) is fatal to the caller; there is
    /// no retry and no fallback port.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let listen = format!("{}:{}", config.host, config.port);
        let addr: SocketAddr = listen.parse().map_err(|e| {
            ServerError::Bind(
                listen.clone(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;

        let std_listener =
            create_listener(addr).map_err(|e| ServerError::Bind(listen.clone(), e))?;
        let listener =
            TcpListener::from_std(std_listener).map_err(|e| ServerError::Bind(listen.clone(), e))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(listen, e))?;
        info!(address = %local_addr, "server listening");

        Ok(Server { listener })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, spawning one handler task per connection.
    ///
    /// Handoff is fire-and-forget: the accepted stream is moved into its
    /// task and the loop immediately returns to `accept`. Accept errors are
    /// transient: they are logged and the loop continues. There is no
    /// shutdown path; the loop ends with the process.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(peer = %addr, "connection accepted");
                    tokio::spawn(handle_connection(stream, addr));
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}

/// Create the listening socket with SO_REUSEADDR set before bind.
fn create_listener(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

/// Outcome of the single read/write pass over one connection.
#[derive(Debug, PartialEq, Eq)]
enum Served {
    /// The peer's bytes were read and written back. `written` is whatever
    /// the single write call reported; it is not verified against
    /// `received`.
    Echoed { received: usize, written: usize },
    /// The peer closed the connection without sending anything.
    NoData,
}

/// Handle one accepted connection end-to-end.
///
/// The stream is owned by this task; every path ends with the connection
/// closed when the stream is dropped on return.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr) {
    match echo_once(&mut stream).await {
        Ok(Served::Echoed { received, written }) => {
            info!(peer = %peer, received, written, "echoed message back");
        }
        Ok(Served::NoData) => {
            info!(peer = %peer, "client disconnected before sending a message");
        }
        Err(e) => {
            warn!(peer = %peer, error = %e, "failed to serve connection");
        }
    }
    info!(peer = %peer, "connection closed");
}

/// Read at most one buffer's worth of bytes and write them back.
///
/// Exactly one read call and at most one write call: no delimiter loop, no
/// write-retry loop. Bytes the peer sends beyond the first read are never
/// drained; the write count is reported, not verified.
async fn echo_once<S>(stream: &mut S) -> std::io::Result<Served>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = [0u8; MAX_MESSAGE_SIZE];

    let received = stream.read(&mut buffer).await?;
    if received == 0 {
        return Ok(Served::NoData);
    }

    debug!(
        text = %String::from_utf8_lossy(&buffer[..received]).trim_end(),
        "client said"
    );

    let written = stream.write(&buffer[..received]).await?;
    Ok(Served::Echoed { received, written })
}

/// Listener setup errors. These are fatal: the server exits rather than
/// retrying or falling back to another port.
#[derive(Debug)]
pub enum ServerError {
    Bind(String, std::io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Bind(addr, e) => {
                write!(f, "Failed to bind '{}': {}", addr, e)
            }
        }
    }
}

impl std::error::Error for ServerError {}
