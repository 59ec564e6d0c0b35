//! Per-connection read/decide/respond loop.
//!
//! A session alternates strictly between receiving one payload and
//! writing one response:
//!
//! ```text
//! AwaitingPayload --payload--> PayloadComplete --decide--> Responding
//!       ^                                                      |
//!       +------------------------ written ---------------------+
//!
//! AwaitingPayload --zero-length first read--> Terminated
//! ```
//!
//! Any read or write failure ends the session with an error. The stream
//! is dropped, and so closed, when [`Session::run`] returns.

use bytes::Bytes;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{info, trace};

use crate::decision::Decide;
use crate::error::{Result, ServerError};
use crate::framing::{Frame, FrameReader};

/// Where the session is in its receive/respond cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingPayload,
    PayloadComplete(Bytes),
    Responding(String),
    Terminated,
}

/// What a session did before it terminated cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Completed receive/respond rounds.
    pub rounds: usize,
    pub bytes_received: usize,
    pub bytes_sent: usize,
}

/// Owns one peer stream for its whole lifetime.
pub struct Session<'a, S> {
    stream: S,
    peer: SocketAddr,
    frames: FrameReader,
    decider: &'a dyn Decide,
    state: SessionState,
    summary: SessionSummary,
}

impl<'a, S> Session<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, buffer_size: usize, decider: &'a dyn Decide) -> Self {
        Self {
            stream,
            peer,
            frames: FrameReader::new(buffer_size),
            decider,
            state: SessionState::AwaitingPayload,
            summary: SessionSummary::default(),
        }
    }

    /// Run rounds until the peer stops sending.
    pub async fn run(mut self) -> Result<SessionSummary> {
        while self.state != SessionState::Terminated {
            let state = std::mem::replace(&mut self.state, SessionState::Terminated);
            self.state = self.step(state).await?;
        }
        Ok(self.summary)
    }

    async fn step(&mut self, state: SessionState) -> Result<SessionState> {
        match state {
            SessionState::AwaitingPayload => {
                let frame = self
                    .frames
                    .next_frame(&mut self.stream)
                    .await
                    .map_err(|source| ServerError::Receive {
                        peer: self.peer,
                        source,
                    })?;

                match frame {
                    Frame::Payload { data, chunks } => {
                        info!(bytes = data.len(), chunks, "payload received");
                        self.summary.bytes_received += data.len();
                        Ok(SessionState::PayloadComplete(data))
                    }
                    Frame::Closed => {
                        info!(peer = %self.peer, "nothing received, closing session");
                        Ok(SessionState::Terminated)
                    }
                }
            }

            SessionState::PayloadComplete(payload) => {
                let output = self.decider.decide(&payload);
                trace!(%output, "decision");
                Ok(SessionState::Responding(output))
            }

            SessionState::Responding(output) => {
                let send_error = |source| ServerError::Send {
                    peer: self.peer,
                    source,
                };
                self.stream
                    .write_all(output.as_bytes())
                    .await
                    .map_err(send_error)?;
                self.stream.flush().await.map_err(send_error)?;

                self.summary.rounds += 1;
                self.summary.bytes_sent += output.len();
                info!(peer = %self.peer, bytes = output.len(), "response sent");
                Ok(SessionState::AwaitingPayload)
            }

            SessionState::Terminated => Ok(SessionState::Terminated),
        }
    }
}
