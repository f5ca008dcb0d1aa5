// Pure text parsers for the remote proc/sysfs formats.
//
// Every function here takes raw file text and returns plain data; no
// I/O, no shared state. Field extraction degrades per field: a
// malformed value defaults or drops that field (or that block/row),
// never the whole record, so one bad line cannot blank out a report.

mod cpu;
mod disk;
mod memory;
mod network;
mod process;
mod system;

pub use cpu::{
    CpuTicks, StatSample, TickPercents, parse_cpu_topology, parse_proc_stat, ticks_between,
    total_time_display,
};
pub use disk::{DiskIoCounters, MountEntry, parse_diskstats, parse_mounts};
pub use memory::parse_meminfo;
pub use network::{
    DevCounters, assign_interface_ips, parse_fib_local_addrs, parse_net_dev, parse_route_subnets,
    parse_snmp,
};
pub use process::{PidStat, parse_pid_stat, parse_pid_statm};
pub use system::{parse_loadavg, parse_temp_millidegrees, parse_uptime};

/// Scale a byte count to the largest 1024-step unit that keeps the
/// value at or above one.
pub fn scale_bytes(raw: f64) -> (f64, String) {
    scale_1024(raw, &["B", "KB", "MB", "GB", "TB", "PB"])
}

/// Scale a bytes-per-second rate the same way.
pub fn scale_rate(raw: f64) -> (f64, String) {
    scale_1024(raw, &["B/s", "KB/s", "MB/s", "GB/s", "TB/s", "PB/s"])
}

fn scale_1024(raw: f64, units: &[&str]) -> (f64, String) {
    let mut value = raw;
    let mut idx = 0;
    while value >= 1024.0 && idx + 1 < units.len() {
        value /= 1024.0;
        idx += 1;
    }
    (value, units[idx].to_string())
}

/// Clamp a time or counter delta so it is never used as a zero
/// denominator; the floor is one tick of whatever unit the caller
/// measures in (one jiffy, one millisecond).
pub fn min_one(delta: i64) -> i64 {
    delta.max(1)
}
