// Memory usage model

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// Point-in-time meminfo breakdown. Occupy fields are fractions of
/// MemTotal (swap fields: fractions of SwapTotal) in [0, 1]; scaled
/// values carry their unit alongside.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub total_mem: f64,
    pub total_mem_unit: String,
    pub free_mem_occupy: f64,
    pub free_mem: f64,
    pub free_mem_unit: String,
    pub available_mem_occupy: f64,
    pub available_mem: f64,
    pub available_mem_unit: String,
    pub buffer_occupy: f64,
    pub buffer: f64,
    pub buffer_unit: String,
    pub cache_occupy: f64,
    pub cached: f64,
    pub cached_unit: String,
    pub dirty_occupy: f64,
    pub dirty: f64,
    pub dirty_unit: String,
    pub swap_total: f64,
    pub swap_total_unit: String,
    pub swap_free_occupy: f64,
    pub swap_free: f64,
    pub swap_free_unit: String,
    pub swap_cached_occupy: f64,
    pub swap_cached: f64,
    pub swap_cached_unit: String,
}
