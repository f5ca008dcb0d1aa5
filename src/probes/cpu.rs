// CPU topology and utilization collectors

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::PollError;
use crate::models::{
    CoreUtilization, CpuTopologyMessage, CpuUtilizationMessage, CpuUtilizationTotal, HostIdentity,
    now_epoch_ms,
};
use crate::parsers::{parse_cpu_topology, parse_proc_stat, ticks_between, total_time_display};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::{MetricProbe, SampleWindow};

const CPUINFO: &str = "/proc/cpuinfo";
const PROC_STAT: &str = "/proc/stat";

/// Reads the processor inventory. Slow-moving, so it runs on a longer
/// cadence than the counters; it also seeds the shared logical CPU
/// count the load-average and process collectors depend on.
pub struct CpuTopologyProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
}

impl CpuTopologyProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
        }
    }
}

#[async_trait]
impl MetricProbe for CpuTopologyProbe {
    type Output = CpuTopologyMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::CpuTopology
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<CpuTopologyMessage>, PollError> {
        let text = fs.read_to_string(CPUINFO).await?;
        let (packages, logical_cpus) = parse_cpu_topology(&text);
        if packages.is_empty() {
            return Err(PollError::parse(CPUINFO, "no usable processor blocks"));
        }
        self.state.set_logical_cpus(logical_cpus);
        Ok(Some(CpuTopologyMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            packages,
        }))
    }
}

/// Two-sample utilization percentages from the stat counters.
pub struct CpuUtilizationProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
    window: SampleWindow,
}

impl CpuUtilizationProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
            window: SampleWindow::default(),
        }
    }
}

#[async_trait]
impl MetricProbe for CpuUtilizationProbe {
    type Output = CpuUtilizationMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::CpuUtilization
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<CpuUtilizationMessage>, PollError> {
        let text = fs.read_to_string(PROC_STAT).await?;
        let now = Instant::now();

        let prev = self.window.get().map(|(raw, _at)| parse_proc_stat(raw));
        let new_sample = parse_proc_stat(&text);
        self.window.advance(text, now);

        let Some(new_sample) = new_sample else {
            return Err(PollError::parse(PROC_STAT, "aggregate cpu line missing"));
        };
        // first sample, or the cached one was unparsable: wait a tick
        let Some(Some(old_sample)) = prev else {
            return Ok(None);
        };

        let total_percents = ticks_between(&old_sample.aggregate, &new_sample.aggregate);
        let (total_time, total_time_unit) =
            total_time_display(new_sample.aggregate.total(), new_sample.cores.len());

        let mut cores = BTreeMap::new();
        for (&processor, new_ticks) in &new_sample.cores {
            let Some(old_ticks) = old_sample.cores.get(&processor) else {
                continue;
            };
            let p = ticks_between(old_ticks, new_ticks);
            cores.insert(
                processor,
                CoreUtilization {
                    processor,
                    utilization: p.utilization,
                    free: p.free,
                    system: p.system,
                    user: p.user,
                    io: p.io,
                    steal: p.steal,
                },
            );
        }

        self.state.record_cpu_utilization(total_percents.utilization);
        Ok(Some(CpuUtilizationMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            total: CpuUtilizationTotal {
                total_time,
                total_time_unit,
                utilization: total_percents.utilization,
                free: total_percents.free,
                system: total_percents.system,
                user: total_percents.user,
                io: total_percents.io,
                steal: total_percents.steal,
            },
            cores,
        }))
    }
}
