//! Error types for the server.
//!
//! Every variant is fatal to the scope it occurs in: bind and accept
//! failures abort the run, receive and send failures end the session.
//! A peer closing the connection is not an error; see
//! [`Frame::Closed`](crate::framing::Frame::Closed).

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serving a peer.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Failed to receive from {peer}: {source}")]
    Receive {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to send to {peer}: {source}")]
    Send {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid buffer size {0}: must be at least 1 byte")]
    InvalidBufferSize(usize),
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ServerError::Bind {
            address: "127.0.0.1:60260".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to bind 127.0.0.1:60260: address in use"
        );

        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let err = ServerError::Send {
            peer,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        };
        assert_eq!(err.to_string(), "Failed to send to 10.0.0.7:5123: broken pipe");

        assert_eq!(
            ConfigError::InvalidBufferSize(0).to_string(),
            "Invalid buffer size 0: must be at least 1 byte"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = ServerError::Accept(io::Error::new(io::ErrorKind::Other, "boom"));
        let source = err.source().expect("accept error carries its io error");
        assert_eq!(source.to_string(), "boom");
    }
}
