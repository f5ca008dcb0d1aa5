// Remote target identity (the session-pool key)

use serde::{Deserialize, Serialize};

/// `(port, host, user)` triple identifying one remote target. The
/// credential is not part of the key: two registrations with the same
/// identity but different passwords address the same session, and the
/// password is only used when a session must be dialed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostIdentity {
    pub port: u16,
    pub host: String,
    pub user: String,
}

impl HostIdentity {
    pub fn new(port: u16, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
            user: user.into(),
        }
    }

    /// `host:port` form used for dialing and error context.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}
