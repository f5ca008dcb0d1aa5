// Rolled-up summary model

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// One-line-per-concern rollup assembled from the latest results of the
/// specialized collectors. Emitted on its own cadence; fields are
/// zero-valued until the contributing collector has produced a result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub cpu: SummaryCpu,
    pub temp: SummaryTemp,
    pub loadavg: SummaryLoad,
    pub memory: SummaryMemory,
    pub net: SummaryNet,
    pub disk: SummaryDisk,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCpu {
    pub utilization: f64,
    pub logical_cpus: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTemp {
    pub highest_temp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLoad {
    pub one_occupy: f64,
    pub five_occupy: f64,
    pub fifteen_occupy: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMemory {
    pub free_mem_occupy: f64,
    pub available_mem_occupy: f64,
    pub swap_free_occupy: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryNet {
    pub up_bytes_h: f64,
    pub up_bytes_h_unit: String,
    pub down_bytes_h: f64,
    pub down_bytes_h_unit: String,
    pub up_speed: f64,
    pub up_speed_unit: String,
    pub down_speed: f64,
    pub down_speed_unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisk {
    pub read: f64,
    pub read_unit: String,
    pub write: f64,
    pub write_unit: String,
    pub read_rate: f64,
    pub read_rate_unit: String,
    pub write_rate: f64,
    pub write_rate_unit: String,
}
