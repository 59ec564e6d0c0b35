//! Listening socket and the single accepted connection.

use chrono::{DateTime, Local};
use std::io;
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener, TcpStream};
use tracing::info;

use crate::error::{Result, ServerError};

/// A bound, passively listening TCP socket.
///
/// The socket stays open until the `Listener` is dropped.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Resolve `address`, bind to it and start listening with `backlog`.
    pub async fn bind_and_listen(address: &str, backlog: i32) -> Result<Self> {
        let bind_error = |source| ServerError::Bind {
            address: address.to_string(),
            source,
        };

        let mut last_error = None;
        for addr in lookup_host(address).await.map_err(bind_error)? {
            match create_listener(addr, backlog) {
                Ok(std_listener) => {
                    let inner = TcpListener::from_std(std_listener).map_err(bind_error)?;
                    let local_addr = inner.local_addr().map_err(bind_error)?;
                    info!(address = %local_addr, backlog, "listening");
                    return Ok(Self { inner, local_addr });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(bind_error(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        })))
    }

    /// Address actually bound, including the kernel-assigned port when 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for one peer to connect.
    pub async fn accept_one(&self) -> Result<Connection> {
        let (stream, peer) = self.inner.accept().await.map_err(ServerError::Accept)?;
        let connection = Connection {
            stream,
            peer,
            established: Local::now(),
        };
        info!(
            peer = %connection.peer,
            established = %connection.established().format("%a %b %e %H:%M:%S %Y"),
            "peer connected"
        );
        Ok(connection)
    }
}

fn create_listener(addr: SocketAddr, backlog: i32) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}

/// An accepted peer connection. Closed when dropped.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    established: DateTime<Local>,
}

impl Connection {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn established(&self) -> DateTime<Local> {
        self.established
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
