// mounts and diskstats parsing

use std::collections::BTreeMap;

/// Filesystem types worth reporting; everything else in the mount
/// table (proc, sysfs, overlay, tmpfs, ...) is noise here.
const REAL_FILESYSTEMS: &[&str] = &[
    "ext2", "ext3", "ext4", "xfs", "btrfs", "vfat", "ntfs", "f2fs", "zfs",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub dev: String,
    pub mount: String,
    pub file_system: String,
}

impl MountEntry {
    /// Device basename, the key `/proc/diskstats` rows use.
    pub fn dev_name(&self) -> &str {
        self.dev.rsplit('/').next().unwrap_or(&self.dev)
    }
}

/// Parse `/proc/mounts`, keeping device-backed mounts with a real
/// filesystem type.
pub fn parse_mounts(text: &str) -> Vec<MountEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let dev = fields.next()?;
            let mount = fields.next()?;
            let file_system = fields.next()?;
            if !dev.starts_with("/dev/") || !REAL_FILESYSTEMS.contains(&file_system) {
                return None;
            }
            Some(MountEntry {
                dev: dev.to_string(),
                mount: mount.to_string(),
                file_system: file_system.to_string(),
            })
        })
        .collect()
}

/// Cumulative I/O counters for one block device; sectors are the
/// 512-byte units `/proc/diskstats` counts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub reads_completed: i64,
    pub sectors_read: i64,
    pub writes_completed: i64,
    pub sectors_written: i64,
}

/// Parse `/proc/diskstats` keyed by device name. Rows with fewer than
/// the ten classic fields are dropped individually.
pub fn parse_diskstats(text: &str) -> BTreeMap<String, DiskIoCounters> {
    let mut devices = BTreeMap::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let int = |idx: usize| fields[idx].parse::<i64>().ok();
        let (Some(reads), Some(sectors_read), Some(writes), Some(sectors_written)) =
            (int(3), int(5), int(7), int(9))
        else {
            continue;
        };
        devices.insert(
            fields[2].to_string(),
            DiskIoCounters {
                reads_completed: reads,
                sectors_read,
                writes_completed: writes,
                sectors_written,
            },
        );
    }
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec 0 0
proc /proc proc rw,nosuid,nodev,noexec 0 0
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sdb1 /data xfs rw,noatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
overlay /var/lib/docker/overlay2/abc overlay rw 0 0
/dev/sdc1 /backup ext4 rw 0 0
";

    #[test]
    fn mounts_keeps_only_device_backed_real_filesystems() {
        let mounts = parse_mounts(MOUNTS);
        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[0].dev, "/dev/sda1");
        assert_eq!(mounts[0].mount, "/");
        assert_eq!(mounts[0].file_system, "ext4");
        assert_eq!(mounts[1].dev_name(), "sdb1");
    }

    const DISKSTATS: &str = "\
   8       0 sda 120 30 4000 500 80 10 2000 300 0 700 800
   8       1 sda1 100 20 3000 400 60 5 1500 200 0 500 600
 253       0 dm-0 50 0 1000 100 40 0 800 90 0 150 190
";

    #[test]
    fn diskstats_reads_sector_and_op_counters() {
        let stats = parse_diskstats(DISKSTATS);
        let sda1 = &stats["sda1"];
        assert_eq!(sda1.reads_completed, 100);
        assert_eq!(sda1.sectors_read, 3000);
        assert_eq!(sda1.writes_completed, 60);
        assert_eq!(sda1.sectors_written, 1500);
    }

    #[test]
    fn diskstats_drops_short_rows() {
        let stats = parse_diskstats("8 0 sda 1 2 3\n");
        assert!(stats.is_empty());
    }
}
