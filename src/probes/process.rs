// Per-process ranking collector

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::error::PollError;
use crate::models::{HostIdentity, Process, ProcessMessage, now_epoch_ms};
use crate::parsers::{min_one, parse_pid_stat, parse_pid_statm, parse_proc_stat, scale_bytes};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::MetricProbe;

const PROC: &str = "/proc";
const PROC_STAT: &str = "/proc/stat";

const PAGE_BYTES: i64 = 4096;

#[derive(Debug, Clone)]
struct PidSample {
    name: String,
    jiffies: i64,
    resident_pages: i64,
}

struct ProcSnapshot {
    total_jiffies: i64,
    per_pid: HashMap<i64, PidSample>,
}

/// Ranks processes by CPU share over the sample window, breaking ties
/// by resident memory, and truncates to the configured count. Needs
/// two full snapshots and the logical CPU count before it can emit.
/// Per-PID reads run with bounded concurrency; a PID that exits
/// mid-snapshot simply drops out.
pub struct ProcessProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
    top_n: usize,
    read_concurrency: usize,
    prev: Option<ProcSnapshot>,
}

impl ProcessProbe {
    pub fn new(
        target: HostIdentity,
        interval: Duration,
        state: Arc<ParserState>,
        top_n: usize,
        read_concurrency: usize,
    ) -> Self {
        Self {
            target,
            interval,
            state,
            top_n,
            read_concurrency: read_concurrency.max(1),
            prev: None,
        }
    }

    async fn snapshot(&self, fs: &Arc<dyn RemoteFs>) -> Result<ProcSnapshot, PollError> {
        let stat_text = fs.read_to_string(PROC_STAT).await?;
        let total_jiffies = parse_proc_stat(&stat_text)
            .ok_or_else(|| PollError::parse(PROC_STAT, "aggregate cpu line missing"))?
            .aggregate
            .total();

        let pids: Vec<i64> = fs
            .list_dir(PROC)
            .await?
            .into_iter()
            .filter_map(|name| name.parse().ok())
            .collect();

        let per_pid: HashMap<i64, PidSample> = futures_util::stream::iter(pids)
            .map(|pid| {
                let fs = fs.clone();
                async move {
                    let stat = fs.read_to_string(&format!("/proc/{pid}/stat")).await.ok()?;
                    let statm = fs
                        .read_to_string(&format!("/proc/{pid}/statm"))
                        .await
                        .ok()?;
                    let stat = parse_pid_stat(&stat)?;
                    let resident_pages = parse_pid_statm(&statm)?;
                    Some((
                        pid,
                        PidSample {
                            name: stat.name,
                            jiffies: stat.jiffies,
                            resident_pages,
                        },
                    ))
                }
            })
            .buffer_unordered(self.read_concurrency)
            .filter_map(|sample| async move { sample })
            .collect()
            .await;

        Ok(ProcSnapshot {
            total_jiffies,
            per_pid,
        })
    }
}

#[async_trait]
impl MetricProbe for ProcessProbe {
    type Output = ProcessMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Process
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<ProcessMessage>, PollError> {
        let logical_cpus = self.state.logical_cpus();
        if logical_cpus == 0 {
            return Ok(None);
        }

        let new = self.snapshot(fs).await?;
        let Some(old) = self.prev.take() else {
            self.prev = Some(new);
            return Ok(None);
        };

        let delta_total = min_one(new.total_jiffies - old.total_jiffies) as f64;
        let cap = 100.0 * logical_cpus as f64;

        let mut processes: Vec<Process> = new
            .per_pid
            .iter()
            .filter_map(|(&pid, sample)| {
                // only PIDs alive across the whole window rank
                let old_sample = old.per_pid.get(&pid)?;
                let delta = (sample.jiffies - old_sample.jiffies) as f64;
                let cpu = (logical_cpus as f64 * 100.0 * delta / delta_total).clamp(0.0, cap);
                let mem_raw = sample.resident_pages * PAGE_BYTES;
                if cpu == 0.0 && mem_raw == 0 {
                    return None;
                }
                let (mem, mem_unit) = scale_bytes(mem_raw as f64);
                Some(Process {
                    pid,
                    name: sample.name.clone(),
                    cpu,
                    mem,
                    mem_unit,
                    mem_raw,
                })
            })
            .collect();

        processes.sort_by(|a, b| a.rank(b));
        processes.truncate(self.top_n);
        self.prev = Some(new);

        Ok(Some(ProcessMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            processes,
        }))
    }
}
