// Periodic poll loop with per-kind subscriber fan-out

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::probes::MetricProbe;
use crate::remote::RemoteFs;
use crate::subscribe::ListenerSet;

/// One spawned collection loop plus the callbacks it feeds. Ticks are
/// processed strictly one at a time; a tick that overruns its interval
/// skips the missed beats instead of bunching them up.
pub struct Poller<M> {
    listeners: Arc<ListenerSet<M>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<M: Clone + Send + Sync + 'static> Poller<M> {
    pub fn spawn<P>(mut probe: P, fs: Arc<dyn RemoteFs>, cancel: CancellationToken) -> Self
    where
        P: MetricProbe<Output = M> + 'static,
    {
        let listeners: Arc<ListenerSet<M>> = Arc::new(ListenerSet::default());
        let emit_to = listeners.clone();
        let handle = tokio::spawn(async move {
            let mut tick = interval(probe.interval());
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        match probe.sample(&fs).await {
                            Ok(Some(message)) => emit_to.emit(&message),
                            Ok(None) => {}
                            Err(e) => {
                                tracing::warn!(
                                    operation = "sample",
                                    metric = %probe.kind(),
                                    error = %e,
                                    "poll tick failed"
                                );
                            }
                        }
                    }
                }
            }
            tracing::debug!(metric = %probe.kind(), "poller stopped");
        });
        Poller {
            listeners,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn listeners(&self) -> &ListenerSet<M> {
        &self.listeners
    }

    /// Wait for the loop to finish after the shared token is cancelled.
    pub async fn join(&self) {
        let handle = match self.handle.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "poller task join failed");
            }
        }
    }
}
