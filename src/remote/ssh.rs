// ssh2-backed transport.
//
// libssh2 handles are blocking, so every operation hops onto the
// blocking pool and serializes through one mutex-guarded handle per
// session. Collector cadences are seconds apart; contention on the
// handle is not a concern.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ssh2::Session;
use tracing::{debug, instrument, warn};

use crate::error::{ConnectError, ReadError};
use crate::models::HostIdentity;

use super::{FsCapacity, RemoteConnector, RemoteFs, RemoteSession};

pub struct SshConnector;

struct SshHandle {
    session: Session,
    sftp: ssh2::Sftp,
}

pub struct SshSession {
    target: HostIdentity,
    handle: Arc<Mutex<SshHandle>>,
    closed: AtomicBool,
}

struct SshFs {
    handle: Arc<Mutex<SshHandle>>,
}

#[async_trait]
impl RemoteConnector for SshConnector {
    #[instrument(skip(self, target, passwd, timeout), fields(operation = "dial", host = %target))]
    async fn dial(
        &self,
        target: &HostIdentity,
        passwd: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn RemoteSession>, ConnectError> {
        let target = target.clone();
        let passwd = passwd.to_string();
        let addr = target.addr();
        match tokio::task::spawn_blocking(move || dial_blocking(&target, &passwd, timeout)).await {
            Ok(result) => result,
            Err(e) => Err(ConnectError::Tcp {
                addr,
                reason: format!("dial task failed: {e}"),
            }),
        }
    }
}

fn dial_blocking(
    target: &HostIdentity,
    passwd: &str,
    timeout: Duration,
) -> Result<Arc<dyn RemoteSession>, ConnectError> {
    let addr = target.addr();
    let tcp_err = |reason: String| ConnectError::Tcp {
        addr: addr.clone(),
        reason,
    };

    let sock = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| tcp_err(e.to_string()))?
        .next()
        .ok_or_else(|| tcp_err("hostname resolved to no addresses".to_string()))?;
    let tcp = TcpStream::connect_timeout(&sock, timeout).map_err(|e| tcp_err(e.to_string()))?;

    let mut session = Session::new().map_err(|e| ConnectError::Handshake {
        addr: addr.clone(),
        reason: e.to_string(),
    })?;
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|e| ConnectError::Handshake {
        addr: addr.clone(),
        reason: e.to_string(),
    })?;

    session
        .userauth_password(&target.user, passwd)
        .map_err(|e| ConnectError::Auth {
            user: target.user.clone(),
            addr: addr.clone(),
            reason: e.to_string(),
        })?;
    if !session.authenticated() {
        return Err(ConnectError::Auth {
            user: target.user.clone(),
            addr: addr.clone(),
            reason: "server rejected the credentials".to_string(),
        });
    }

    session.set_blocking(true);
    let sftp = session.sftp().map_err(|e| ConnectError::Sftp {
        addr: addr.clone(),
        reason: e.to_string(),
    })?;

    debug!(host = %target, "ssh session established");
    Ok(Arc::new(SshSession {
        target: target.clone(),
        handle: Arc::new(Mutex::new(SshHandle { session, sftp })),
        closed: AtomicBool::new(false),
    }))
}

#[async_trait]
impl RemoteSession for SshSession {
    fn fs(&self) -> Arc<dyn RemoteFs> {
        Arc::new(SshFs {
            handle: self.handle.clone(),
        })
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = self.handle.clone();
        let target = self.target.clone();
        let disconnected = tokio::task::spawn_blocking(move || {
            let Ok(guard) = handle.lock() else {
                return false;
            };
            guard
                .session
                .disconnect(Some(ssh2::DisconnectCode::ByApplication), "closing", None)
                .is_ok()
        })
        .await
        .unwrap_or(false);
        debug!(host = %target, disconnected, "ssh session closed");
    }
}

impl SshFs {
    /// Run a blocking closure against the shared handle.
    async fn with_handle<T, F>(&self, path: &str, op: F) -> Result<T, ReadError>
    where
        T: Send + 'static,
        F: FnOnce(&SshHandle) -> Result<T, ReadError> + Send + 'static,
    {
        let handle = self.handle.clone();
        let path_for_join = path.to_string();
        let path = path.to_string();
        match tokio::task::spawn_blocking(move || {
            let guard = handle
                .lock()
                .map_err(|e| ReadError::new(&path, format!("session lock poisoned: {e}")))?;
            op(&guard)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => Err(ReadError::new(
                path_for_join,
                format!("blocking task failed: {e}"),
            )),
        }
    }
}

#[async_trait]
impl RemoteFs for SshFs {
    async fn read_to_string(&self, path: &str) -> Result<String, ReadError> {
        let owned = path.to_string();
        self.with_handle(path, move |handle| {
            let mut file = handle
                .sftp
                .open(Path::new(&owned))
                .map_err(|e| ReadError::new(&owned, e))?;
            let mut text = String::new();
            file.read_to_string(&mut text)
                .map_err(|e| ReadError::new(&owned, e))?;
            Ok(text)
        })
        .await
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, ReadError> {
        let owned = path.to_string();
        self.with_handle(path, move |handle| {
            let entries = handle
                .sftp
                .readdir(Path::new(&owned))
                .map_err(|e| ReadError::new(&owned, e))?;
            Ok(entries
                .into_iter()
                .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect())
        })
        .await
    }

    /// libssh2's SFTP surface has no statvfs, so capacity comes from a
    /// one-shot exec of stat(1) on the mount point.
    async fn capacity(&self, path: &str) -> Result<FsCapacity, ReadError> {
        let owned = path.to_string();
        let command = format!("stat -f -c '%S %b %f' {}", shell_quote(path));
        self.with_handle(path, move |handle| {
            let mut channel = handle
                .session
                .channel_session()
                .map_err(|e| ReadError::new(&owned, e))?;
            channel.exec(&command).map_err(|e| ReadError::new(&owned, e))?;
            let mut output = String::new();
            channel
                .read_to_string(&mut output)
                .map_err(|e| ReadError::new(&owned, e))?;
            channel.wait_close().ok();

            let mut fields = output.split_whitespace();
            let (Some(bsize), Some(blocks), Some(bfree)) = (
                fields.next().and_then(|f| f.parse().ok()),
                fields.next().and_then(|f| f.parse().ok()),
                fields.next().and_then(|f| f.parse().ok()),
            ) else {
                warn!(path = %owned, output = %output.trim(), "unexpected stat output");
                return Err(ReadError::new(&owned, "unexpected stat output"));
            };
            Ok(FsCapacity {
                blocks,
                bfree,
                bsize,
            })
        })
        .await
    }

    async fn exists(&self, path: &str) -> bool {
        let owned = path.to_string();
        self.with_handle(path, move |handle| {
            Ok(handle.sftp.stat(Path::new(&owned)).is_ok())
        })
        .await
        .unwrap_or(false)
    }
}

fn shell_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', "'\\''"))
}
