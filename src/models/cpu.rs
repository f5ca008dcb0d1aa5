// CPU topology and utilization models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// Physical package -> core -> logical processor hierarchy parsed from
/// the cpuinfo block list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuTopologyMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub packages: BTreeMap<i64, CpuPackage>,
}

/// One physical package; descriptive fields come from the first block
/// that introduced this physical id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuPackage {
    pub physical_id: i64,
    pub vendor_id: String,
    pub cpu_family: String,
    pub model: String,
    pub model_name: String,
    pub stepping: String,
    pub cache_size: String,
    /// Logical processors in this package.
    pub siblings: i64,
    /// Physical cores in this package.
    pub cpu_cores: i64,
    pub fpu: bool,
    pub fpu_exception: bool,
    pub bogomips: f64,
    pub clflush_size: i64,
    pub cache_alignment: i64,
    pub address_sizes: String,
    pub cores: BTreeMap<i64, CpuCore>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuCore {
    pub core_id: i64,
    pub processors: BTreeMap<i64, LogicalCpu>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalCpu {
    pub processor: i64,
    pub cpu_mhz: f64,
    pub apic_id: i64,
}

/// Two-sample utilization percentages, aggregate plus per logical core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUtilizationMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub total: CpuUtilizationTotal,
    pub cores: BTreeMap<i64, CoreUtilization>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUtilizationTotal {
    /// Wall-clock run time recovered from total jiffies, scaled to the
    /// largest unit that is at least one.
    pub total_time: i64,
    pub total_time_unit: String,
    pub utilization: f64,
    pub free: f64,
    pub system: f64,
    pub user: f64,
    pub io: f64,
    pub steal: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreUtilization {
    pub processor: i64,
    pub utilization: f64,
    pub free: f64,
    pub system: f64,
    pub user: f64,
    pub io: f64,
    pub steal: f64,
}
