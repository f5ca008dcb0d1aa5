// Disk capacity and throughput collector

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::PollError;
use crate::models::{Disk, DiskMessage, HostIdentity, SummaryDisk, now_epoch_ms};
use crate::parsers::{parse_diskstats, parse_mounts, scale_bytes, scale_rate};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::{MetricProbe, SampleWindow, elapsed_ms};

const MOUNTS: &str = "/proc/mounts";
const DISKSTATS: &str = "/proc/diskstats";

const SECTOR_BYTES: i64 = 512;

/// Real-filesystem mounts with capacity from the remote statfs query
/// and throughput/IOPS from two diskstats samples, keyed by mount
/// point. A mount whose device has no diskstats row reports zero
/// rates; a mount whose capacity query fails reports zero capacity.
pub struct DiskProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
    window: SampleWindow,
}

impl DiskProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
            window: SampleWindow::default(),
        }
    }
}

#[async_trait]
impl MetricProbe for DiskProbe {
    type Output = DiskMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Disk
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(&mut self, fs: &Arc<dyn RemoteFs>) -> Result<Option<DiskMessage>, PollError> {
        let mounts_text = fs.read_to_string(MOUNTS).await?;
        let stats_text = fs.read_to_string(DISKSTATS).await?;
        let now = Instant::now();

        let prev = self
            .window
            .get()
            .map(|(raw, at)| (parse_diskstats(raw), at));
        let new_stats = parse_diskstats(&stats_text);
        self.window.advance(stats_text, now);

        let Some((old_stats, old_at)) = prev else {
            return Ok(None);
        };
        let elapsed = elapsed_ms(old_at, now);

        let mut disks = BTreeMap::new();
        let (mut read_total_raw, mut write_total_raw) = (0.0f64, 0.0f64);
        let (mut read_rate_raw, mut write_rate_raw) = (0.0f64, 0.0f64);

        for mount in parse_mounts(&mounts_text) {
            let new_io = new_stats.get(mount.dev_name()).copied().unwrap_or_default();
            let old_io = old_stats.get(mount.dev_name()).copied().unwrap_or(new_io);

            let dev_read_total = (new_io.sectors_read * SECTOR_BYTES) as f64;
            let dev_write_total = (new_io.sectors_written * SECTOR_BYTES) as f64;
            let dev_read_rate = ((new_io.sectors_read - old_io.sectors_read) * SECTOR_BYTES)
                as f64
                * 1000.0
                / elapsed as f64;
            let dev_write_rate = ((new_io.sectors_written - old_io.sectors_written) * SECTOR_BYTES)
                as f64
                * 1000.0
                / elapsed as f64;
            let read_iops =
                (new_io.reads_completed - old_io.reads_completed) * 1000 / elapsed;
            let write_iops =
                (new_io.writes_completed - old_io.writes_completed) * 1000 / elapsed;

            let capacity = match fs.capacity(&mount.mount).await {
                Ok(cap) => cap,
                Err(e) => {
                    debug!(mount = %mount.mount, error = %e, "capacity query failed");
                    Default::default()
                }
            };
            let (free, free_unit) = scale_bytes(capacity.free_bytes() as f64);
            let (total, total_unit) = scale_bytes(capacity.total_bytes() as f64);
            let free_rate = if capacity.total_bytes() > 0 {
                capacity.free_bytes() as f64 / capacity.total_bytes() as f64
            } else {
                0.0
            };

            read_total_raw += dev_read_total;
            write_total_raw += dev_write_total;
            read_rate_raw += dev_read_rate;
            write_rate_raw += dev_write_rate;

            let (read, read_unit) = scale_bytes(dev_read_total);
            let (write, write_unit) = scale_bytes(dev_write_total);
            let (read_rate, read_rate_unit) = scale_rate(dev_read_rate);
            let (write_rate, write_rate_unit) = scale_rate(dev_write_rate);

            disks.insert(
                mount.mount.clone(),
                Disk {
                    dev_name: mount.dev_name().to_string(),
                    mount: mount.mount.clone(),
                    file_system: mount.file_system.clone(),
                    free,
                    free_unit,
                    total,
                    total_unit,
                    free_rate,
                    read,
                    read_unit,
                    write,
                    write_unit,
                    read_rate,
                    read_rate_unit,
                    write_rate,
                    write_rate_unit,
                    read_iops,
                    write_iops,
                },
            );
        }

        let (read, read_unit) = scale_bytes(read_total_raw);
        let (write, write_unit) = scale_bytes(write_total_raw);
        let (read_rate, read_rate_unit) = scale_rate(read_rate_raw);
        let (write_rate, write_rate_unit) = scale_rate(write_rate_raw);

        self.state.record_disk(SummaryDisk {
            read,
            read_unit: read_unit.clone(),
            write,
            write_unit: write_unit.clone(),
            read_rate,
            read_rate_unit: read_rate_unit.clone(),
            write_rate,
            write_rate_unit: write_rate_unit.clone(),
        });

        Ok(Some(DiskMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            read,
            read_unit,
            write,
            write_unit,
            read_rate,
            read_rate_unit,
            write_rate,
            write_rate_unit,
            disks,
        }))
    }
}
