//! Inbound command dispatch.
//!
//! Commands arrive as bare text tokens from any channel (the remote
//! subscribe/publish link or the local datagram port) and map to the same
//! two actions. Unrecognized input is noise, not a fault, and is dropped
//! without an error.

use crate::constants::{CMD_CLOSE_LOCK, CMD_OPEN_LOCK};
use std::fmt;

/// A recognized inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Unlock and enter the waiting window (`"openlock"`).
    Open,
    /// Lock immediately, regardless of mode (`"closelock"`).
    Close,
}

impl Command {
    /// Parse a raw payload into a command.
    ///
    /// Leading/trailing whitespace is trimmed; matching is exact and
    /// case-sensitive. Returns `None` for anything else.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            CMD_OPEN_LOCK => Some(Command::Open),
            CMD_CLOSE_LOCK => Some(Command::Close),
            _ => None,
        }
    }

    /// The wire token for this command.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Command::Open => CMD_OPEN_LOCK,
            Command::Close => CMD_CLOSE_LOCK,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
