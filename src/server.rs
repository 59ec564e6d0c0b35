//! Single-peer TCP server.
//!
//! Binds the configured endpoint, accepts exactly one connection and
//! serves it until the peer stops sending. No further peers are accepted.

use std::net::SocketAddr;

use crate::config::Config;
use crate::decision::Decide;
use crate::error::Result;
use crate::listener::Listener;
use crate::session::{Session, SessionSummary};

/// Server instance
pub struct Server {
    config: Config,
    listener: Listener,
    decider: Box<dyn Decide>,
}

impl Server {
    /// Bind the listening socket. Fails if the endpoint is unavailable.
    pub async fn bind(config: Config, decider: Box<dyn Decide>) -> Result<Self> {
        let listener = Listener::bind_and_listen(&config.listen_address(), config.backlog).await?;
        Ok(Server {
            config,
            listener,
            decider,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Accept one peer and serve it to completion.
    ///
    /// The listening socket and the connection are both closed when this returns.
    pub async fn run(self) -> Result<SessionSummary> {
        let connection = self.listener.accept_one().await?;
        let peer = connection.peer();

        Session::new(
            connection.into_stream(),
            peer,
            self.config.buffer_size,
            self.decider.as_ref(),
        )
        .run()
        .await
    }
}
