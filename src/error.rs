// Error taxonomy: dial/setup failures surface to the register caller;
// per-tick read/parse failures are logged by the poller and skipped.

use thiserror::Error;

/// Dial or session-setup failure. Returned synchronously from
/// registration; no session is created or retained when this occurs.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("tcp connect to {addr} failed: {reason}")]
    Tcp { addr: String, reason: String },

    #[error("ssh handshake with {addr} failed: {reason}")]
    Handshake { addr: String, reason: String },

    #[error("authentication of {user}@{addr} failed: {reason}")]
    Auth {
        user: String,
        addr: String,
        reason: String,
    },

    #[error("sftp channel on {addr} failed: {reason}")]
    Sftp { addr: String, reason: String },
}

/// A remote file was unreadable on one tick. The cached previous sample
/// stays untouched so the next good read still computes a valid delta.
#[derive(Debug, Error)]
#[error("read {path}: {reason}")]
pub struct ReadError {
    pub path: String,
    pub reason: String,
}

impl ReadError {
    pub fn new(path: impl ToString, reason: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// One poll tick failed. Never fatal: the poller logs it and keeps its
/// schedule.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl PollError {
    pub fn parse(path: impl ToString, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
