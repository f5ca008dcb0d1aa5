// Disk capacity and throughput models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// Mounted-filesystem stats: capacity from the remote statfs query,
/// throughput/IOPS derived from two diskstats samples. Aggregate fields
/// sum every matched device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub read: f64,
    pub read_unit: String,
    pub write: f64,
    pub write_unit: String,
    pub read_rate: f64,
    pub read_rate_unit: String,
    pub write_rate: f64,
    pub write_rate_unit: String,
    pub disks: BTreeMap<String, Disk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub dev_name: String,
    pub mount: String,
    pub file_system: String,
    pub free: f64,
    pub free_unit: String,
    pub total: f64,
    pub total_unit: String,
    /// Free over total capacity in [0, 1].
    pub free_rate: f64,
    pub read: f64,
    pub read_unit: String,
    pub write: f64,
    pub write_unit: String,
    pub read_rate: f64,
    pub read_rate_unit: String,
    pub write_rate: f64,
    pub write_rate_unit: String,
    pub read_iops: i64,
    pub write_iops: i64,
}
