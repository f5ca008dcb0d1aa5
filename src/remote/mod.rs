// Remote transport seam.
//
// The collectors only ever touch these traits; the production
// implementation drives one SSH/SFTP session, tests plug in an
// in-memory filesystem.

mod ssh;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConnectError, ReadError};
use crate::models::HostIdentity;

pub use ssh::SshConnector;

/// Opens sessions. One implementation per transport; the session pool
/// holds whichever connector it was built with.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn dial(
        &self,
        target: &HostIdentity,
        passwd: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn RemoteSession>, ConnectError>;
}

/// One live connection to a remote host.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    fn fs(&self) -> Arc<dyn RemoteFs>;

    /// Tear the connection down. Repeat calls are no-ops.
    async fn close(&self);
}

/// File access on the remote host.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    async fn read_to_string(&self, path: &str) -> Result<String, ReadError>;

    /// Entry names (not full paths) of a directory.
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, ReadError>;

    /// Filesystem capacity of the volume holding `path`.
    async fn capacity(&self, path: &str) -> Result<FsCapacity, ReadError>;

    async fn exists(&self, path: &str) -> bool;
}

/// statfs-style capacity triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsCapacity {
    pub blocks: u64,
    pub bfree: u64,
    pub bsize: u64,
}

impl FsCapacity {
    pub fn total_bytes(&self) -> u64 {
        self.blocks * self.bsize
    }

    pub fn free_bytes(&self) -> u64 {
        self.bfree * self.bsize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_multiplies_block_size() {
        let cap = FsCapacity {
            blocks: 1000,
            bfree: 250,
            bsize: 4096,
        };
        assert_eq!(cap.total_bytes(), 4_096_000);
        assert_eq!(cap.free_bytes(), 1_024_000);
    }
}
