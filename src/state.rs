// Shared per-session parser state

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use crate::models::{SummaryDisk, SummaryLoad, SummaryMemory, SummaryNet};

/// Latest per-concern results feeding the summary rollup. Each
/// collector overwrites only its own group; the summary collector takes
/// a clone.
#[derive(Debug, Clone, Default)]
pub struct SummarySeed {
    pub cpu_utilization: f64,
    pub highest_temp: i64,
    pub loadavg: SummaryLoad,
    pub memory: SummaryMemory,
    pub net: SummaryNet,
    pub disk: SummaryDisk,
}

/// State carried across polls of one session: the logical CPU count
/// discovered by the topology collector (load-average occupancy and
/// process CPU share need it) and the summary seed. Zero CPUs means
/// "not known yet".
#[derive(Debug, Default)]
pub struct ParserState {
    logical_cpus: AtomicU32,
    seed: RwLock<SummarySeed>,
}

impl ParserState {
    pub fn logical_cpus(&self) -> u32 {
        self.logical_cpus.load(Ordering::Relaxed)
    }

    pub fn set_logical_cpus(&self, count: u32) {
        if count > 0 {
            self.logical_cpus.store(count, Ordering::Relaxed);
        }
    }

    pub fn record_cpu_utilization(&self, utilization: f64) {
        if let Ok(mut seed) = self.seed.write() {
            seed.cpu_utilization = utilization;
        }
    }

    pub fn record_highest_temp(&self, highest: i64) {
        if let Ok(mut seed) = self.seed.write() {
            seed.highest_temp = highest;
        }
    }

    pub fn record_loadavg(&self, loadavg: SummaryLoad) {
        if let Ok(mut seed) = self.seed.write() {
            seed.loadavg = loadavg;
        }
    }

    pub fn record_memory(&self, memory: SummaryMemory) {
        if let Ok(mut seed) = self.seed.write() {
            seed.memory = memory;
        }
    }

    pub fn record_net(&self, net: SummaryNet) {
        if let Ok(mut seed) = self.seed.write() {
            seed.net = net;
        }
    }

    pub fn record_disk(&self, disk: SummaryDisk) {
        if let Ok(mut seed) = self.seed.write() {
            seed.disk = disk;
        }
    }

    pub fn summary_seed(&self) -> SummarySeed {
        self.seed
            .read()
            .map(|seed| seed.clone())
            .unwrap_or_default()
    }
}
