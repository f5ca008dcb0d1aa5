// Session pool: get-or-create per identity, evict on last unsubscribe

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, instrument};

use crate::config::MonitorConfig;
use crate::error::ConnectError;
use crate::models::{HostIdentity, SummaryMessage};
use crate::remote::RemoteConnector;
use crate::session::HostSession;
use crate::subscribe::{MetricKind, MetricListener};

type SessionSlot = Arc<tokio::sync::Mutex<Option<Arc<HostSession>>>>;

/// Keeps at most one live session per identity. The outer mutex only
/// guards the slot map and is never held across an await; the
/// per-identity slot serializes check/dial/insert/evict for that
/// identity, so concurrent registrations against one host dial once
/// while different hosts proceed in parallel. Slots persist after
/// eviction - an empty slot is just a parking space, not a session.
pub struct SessionManager {
    connector: Arc<dyn RemoteConnector>,
    config: MonitorConfig,
    slots: Mutex<HashMap<HostIdentity, SessionSlot>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn RemoteConnector>, config: MonitorConfig) -> Self {
        Self {
            connector,
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, target: &HostIdentity) -> SessionSlot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(target.clone()).or_default().clone()
    }

    fn existing_slot(&self, target: &HostIdentity) -> Option<SessionSlot> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(target).cloned()
    }

    fn all_slots(&self) -> Vec<(HostIdentity, SessionSlot)> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .iter()
            .map(|(target, slot)| (target.clone(), slot.clone()))
            .collect()
    }

    /// Attach a callback to `target`, dialing a session first if none
    /// is live. A dial failure is returned to this caller and leaves
    /// the pool unchanged; later registrations will retry the dial.
    #[instrument(
        skip(self, target, passwd, key, listener),
        fields(operation = "register_listener", host = %target, key = %key, kind = %listener.kind())
    )]
    pub async fn register_listener(
        &self,
        target: &HostIdentity,
        passwd: &str,
        key: &str,
        listener: MetricListener,
    ) -> Result<(), ConnectError> {
        let slot = self.slot(target);
        let mut guard = slot.lock().await;
        let session = match guard.as_ref() {
            Some(session) => session.clone(),
            None => {
                let session =
                    HostSession::open(self.connector.as_ref(), target, passwd, &self.config)
                        .await?;
                *guard = Some(session.clone());
                session
            }
        };
        session.register(key, listener);
        Ok(())
    }

    /// Sugar for the rollup feed most consumers start with.
    pub async fn register_summary_listener(
        &self,
        target: &HostIdentity,
        passwd: &str,
        key: &str,
        callback: impl Fn(&SummaryMessage) + Send + Sync + 'static,
    ) -> Result<(), ConnectError> {
        self.register_listener(target, passwd, key, MetricListener::Summary(Arc::new(callback)))
            .await
    }

    /// Detach `key` from one kind on `target`; when that leaves the
    /// session with no subscriber of any kind, the session is taken out
    /// of its slot and closed. Unknown identities and keys are no-ops.
    #[instrument(
        skip(self, target, key, kind),
        fields(operation = "remove_listener", host = %target, key = %key, kind = %kind)
    )]
    pub async fn remove_listener(&self, target: &HostIdentity, key: &str, kind: MetricKind) {
        let Some(slot) = self.existing_slot(target) else {
            return;
        };
        let mut guard = slot.lock().await;
        let Some(session) = guard.as_ref() else {
            return;
        };
        session.remove(kind, key);
        if !session.has_any_subscriber() {
            // closing under the slot lock keeps a concurrent register
            // from touching the session mid-teardown
            if let Some(session) = guard.take() {
                session.close().await;
                debug!(host = %target, "last subscriber left, session evicted");
            }
        }
    }

    pub async fn remove_summary_listener(&self, target: &HostIdentity, key: &str) {
        self.remove_listener(target, key, MetricKind::Summary).await;
    }

    /// Detach `key` from every kind on every session, evicting the
    /// sessions that end up with no subscribers. For consumers that
    /// disappear wholesale.
    #[instrument(skip(self, key), fields(operation = "clear_subscriber", key = %key))]
    pub async fn clear_subscriber(&self, key: &str) {
        for (target, slot) in self.all_slots() {
            let mut guard = slot.lock().await;
            let Some(session) = guard.as_ref() else {
                continue;
            };
            session.remove_everywhere(key);
            if !session.has_any_subscriber() {
                if let Some(session) = guard.take() {
                    session.close().await;
                    debug!(host = %target, "last subscriber left, session evicted");
                }
            }
        }
    }

    /// Live sessions in the pool.
    pub async fn session_count(&self) -> usize {
        let mut live = 0;
        for (_, slot) in self.all_slots() {
            if slot.lock().await.is_some() {
                live += 1;
            }
        }
        live
    }
}
