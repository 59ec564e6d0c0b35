//! Decision capability.
//!
//! Maps one received payload to the command text sent back to the peer.
//! The session treats it as a synchronous black box that always returns.

/// Produces a control command for a received payload.
pub trait Decide: Send + Sync {
    fn decide(&self, payload: &[u8]) -> String;
}

impl<F> Decide for F
where
    F: Fn(&[u8]) -> String + Send + Sync,
{
    fn decide(&self, payload: &[u8]) -> String {
        self(payload)
    }
}

/// Returns the same command for every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCommand {
    command: String,
}

impl FixedCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Decide for FixedCommand {
    fn decide(&self, _payload: &[u8]) -> String {
        self.command.clone()
    }
}
