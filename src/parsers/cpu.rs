// cpuinfo topology and stat counter parsing

use std::collections::BTreeMap;

use crate::models::{CpuCore, CpuPackage, LogicalCpu};

/// Parse the blank-line-separated per-processor blocks of
/// `/proc/cpuinfo` into the package -> core -> logical-processor map.
/// Blocks missing any of the three placement ids (processor, physical
/// id, core id) are skipped whole; any other malformed field keeps its
/// default. Returns the map plus the logical CPU count taken from the
/// first block's `siblings` line (0 when absent).
pub fn parse_cpu_topology(text: &str) -> (BTreeMap<i64, CpuPackage>, u32) {
    let mut packages: BTreeMap<i64, CpuPackage> = BTreeMap::new();
    let mut logical_cpus = 0u32;

    for block in text.split("\n\n").filter(|b| !b.trim().is_empty()) {
        let fields: BTreeMap<&str, &str> = block
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                Some((key.trim(), value.trim()))
            })
            .collect();

        let Some(processor) = fields.get("processor").and_then(|v| v.parse().ok()) else {
            continue;
        };
        let Some(physical_id) = fields.get("physical id").and_then(|v| v.parse().ok()) else {
            continue;
        };
        let Some(core_id) = fields.get("core id").and_then(|v| v.parse().ok()) else {
            continue;
        };

        let int = |key: &str| fields.get(key).and_then(|v| v.parse::<i64>().ok());
        let float = |key: &str| fields.get(key).and_then(|v| v.parse::<f64>().ok());
        let text_of = |key: &str| fields.get(key).map(|v| v.to_string()).unwrap_or_default();
        let flag = |key: &str| fields.get(key).is_some_and(|v| *v == "yes");

        if logical_cpus == 0 {
            logical_cpus = int("siblings").unwrap_or(0).max(0) as u32;
        }

        let package = packages.entry(physical_id).or_insert_with(|| CpuPackage {
            physical_id,
            vendor_id: text_of("vendor_id"),
            cpu_family: text_of("cpu family"),
            model: text_of("model"),
            model_name: text_of("model name"),
            stepping: text_of("stepping"),
            cache_size: text_of("cache size"),
            siblings: int("siblings").unwrap_or(0),
            cpu_cores: int("cpu cores").unwrap_or(0),
            fpu: flag("fpu"),
            fpu_exception: flag("fpu_exception"),
            bogomips: float("bogomips").unwrap_or(0.0),
            clflush_size: int("clflush size").unwrap_or(0),
            cache_alignment: int("cache_alignment").unwrap_or(0),
            address_sizes: text_of("address sizes"),
            cores: BTreeMap::new(),
        });

        let core = package.cores.entry(core_id).or_insert_with(|| CpuCore {
            core_id,
            processors: BTreeMap::new(),
        });
        core.processors.insert(
            processor,
            LogicalCpu {
                processor,
                cpu_mhz: float("cpu MHz").unwrap_or(0.0),
                apic_id: int("apicid").unwrap_or(0),
            },
        );
    }

    (packages, logical_cpus)
}

/// The ten counters of one `cpu`/`cpuN` line in `/proc/stat`, in
/// jiffies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub user: i64,
    pub nice: i64,
    pub system: i64,
    pub idle: i64,
    pub iowait: i64,
    pub irq: i64,
    pub softirq: i64,
    pub steal: i64,
    pub guest: i64,
    pub guest_nice: i64,
}

impl CpuTicks {
    pub fn total(&self) -> i64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
            + self.guest
            + self.guest_nice
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let mut v = [0i64; 10];
        for (slot, field) in v.iter_mut().zip(fields) {
            *slot = field.parse().ok()?;
        }
        Some(CpuTicks {
            user: v[0],
            nice: v[1],
            system: v[2],
            idle: v[3],
            iowait: v[4],
            irq: v[5],
            softirq: v[6],
            steal: v[7],
            guest: v[8],
            guest_nice: v[9],
        })
    }
}

/// Aggregate plus per-core counters from one read of `/proc/stat`.
#[derive(Debug, Clone, Default)]
pub struct StatSample {
    pub aggregate: CpuTicks,
    pub cores: BTreeMap<i64, CpuTicks>,
}

/// Parse `/proc/stat`. The aggregate `cpu ` line is required; malformed
/// `cpuN` lines are dropped individually.
pub fn parse_proc_stat(text: &str) -> Option<StatSample> {
    let mut aggregate = None;
    let mut cores = BTreeMap::new();

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((&label, counters)) = fields.split_first() else {
            continue;
        };
        if label == "cpu" {
            aggregate = CpuTicks::from_fields(counters);
        } else if let Some(n) = label.strip_prefix("cpu") {
            let (Ok(processor), Some(ticks)) = (n.parse::<i64>(), CpuTicks::from_fields(counters))
            else {
                continue;
            };
            cores.insert(processor, ticks);
        }
    }

    Some(StatSample {
        aggregate: aggregate?,
        cores,
    })
}

/// Percentages over a tick window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickPercents {
    pub utilization: f64,
    pub free: f64,
    pub system: f64,
    pub user: f64,
    pub io: f64,
    pub steal: f64,
}

/// Percentages between two counter readings of the same line. The total
/// delta is floored to one jiffy so an idle window still divides.
pub fn ticks_between(old: &CpuTicks, new: &CpuTicks) -> TickPercents {
    let total = super::min_one(new.total() - old.total()) as f64;
    let pct = |new_v: i64, old_v: i64| 100.0 * (new_v - old_v) as f64 / total;

    let free = pct(new.idle, old.idle);
    TickPercents {
        utilization: 100.0 - free,
        free,
        system: pct(new.system, old.system),
        user: pct(new.user, old.user),
        io: pct(new.iowait, old.iowait),
        steal: pct(new.steal, old.steal),
    }
}

/// Recover wall-clock run time from the aggregate jiffy total: jiffies
/// are 10 ms each and accumulate across every core, so divide by the
/// core-line count, then scale to the largest time unit at least one.
pub fn total_time_display(aggregate_total: i64, core_lines: usize) -> (i64, String) {
    let per_core_ms = aggregate_total * 10 / core_lines.max(1) as i64;
    let secs = per_core_ms / 1000;
    let steps: [(i64, &str); 4] = [
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
        (1, "second"),
    ];
    for (span, unit) in steps {
        if secs >= span {
            return (secs / span, unit.to_string());
        }
    }
    (secs, "second".to_string())
}
