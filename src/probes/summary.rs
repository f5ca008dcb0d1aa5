// Rollup collector

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PollError;
use crate::models::{HostIdentity, SummaryCpu, SummaryMessage, SummaryTemp, now_epoch_ms};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::MetricProbe;

/// Repackages the latest results of the specialized collectors; reads
/// nothing from the remote host itself. Emits from the first tick -
/// fields a collector has not fed yet are simply zero.
pub struct SummaryProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
}

impl SummaryProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
        }
    }
}

#[async_trait]
impl MetricProbe for SummaryProbe {
    type Output = SummaryMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Summary
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        _fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<SummaryMessage>, PollError> {
        let seed = self.state.summary_seed();
        Ok(Some(SummaryMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            cpu: SummaryCpu {
                utilization: seed.cpu_utilization,
                logical_cpus: self.state.logical_cpus(),
            },
            temp: SummaryTemp {
                highest_temp: seed.highest_temp,
            },
            loadavg: seed.loadavg,
            memory: seed.memory,
            net: seed.net,
            disk: seed.disk,
        }))
    }
}
