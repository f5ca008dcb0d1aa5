// Uptime, load average and thermal models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HostIdentity;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub up_day: i64,
    pub up_hour: i64,
    pub up_min: i64,
    pub up_sec: i64,
}

/// Load averages plus their occupancy (load divided by logical CPU
/// count) and the scheduler counters from the fourth/fifth fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadAvgMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub one: f64,
    pub one_occupy: f64,
    pub five: f64,
    pub five_occupy: f64,
    pub fifteen: f64,
    pub fifteen_occupy: f64,
    pub running: i64,
    pub active: i64,
    pub last_pid: i64,
}

/// Thermal zone readings in whole degrees Celsius, keyed by zone name
/// (`thermal_zone0`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub zones: BTreeMap<String, i64>,
}
