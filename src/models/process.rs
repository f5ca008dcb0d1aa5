// Per-process ranking model

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// Busiest processes, ranked by CPU share then resident memory,
/// truncated to the configured count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub processes: Vec<Process>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub pid: i64,
    pub name: String,
    /// Percent of one core over the sample window; can exceed 100 on
    /// multi-threaded processes, capped at 100 x logical cores.
    pub cpu: f64,
    pub mem: f64,
    pub mem_unit: String,
    pub mem_raw: i64,
}

impl Process {
    /// CPU descending, resident memory breaking ties.
    pub fn rank(&self, other: &Self) -> Ordering {
        match other.cpu.partial_cmp(&self.cpu) {
            Some(Ordering::Equal) | None => other.mem_raw.cmp(&self.mem_raw),
            Some(ord) => ord,
        }
    }
}
