// Shared test doubles: an in-memory remote filesystem plus a connector
// that counts dials and session closes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hostwatch::MonitorConfig;
use hostwatch::error::{ConnectError, ReadError};
use hostwatch::models::HostIdentity;
use hostwatch::remote::{FsCapacity, RemoteConnector, RemoteFs, RemoteSession};

/// In-memory stand-in for the remote filesystem. Contents can be
/// swapped between poll ticks through the shared handle.
#[derive(Default)]
pub struct StubFs {
    files: Mutex<HashMap<String, String>>,
    dirs: Mutex<HashMap<String, Vec<String>>>,
    capacities: Mutex<HashMap<String, FsCapacity>>,
    extra_paths: Mutex<HashSet<String>>,
}

impl StubFs {
    pub fn put_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn put_dir(&self, path: &str, entries: &[&str]) {
        self.dirs.lock().unwrap().insert(
            path.to_string(),
            entries.iter().map(|e| e.to_string()).collect(),
        );
    }

    pub fn put_capacity(&self, path: &str, capacity: FsCapacity) {
        self.capacities
            .lock()
            .unwrap()
            .insert(path.to_string(), capacity);
    }

    /// Make `exists` answer true for a path that has no content, e.g.
    /// a `/sys/devices/virtual/net/<name>` marker directory.
    pub fn mark_present(&self, path: &str) {
        self.extra_paths.lock().unwrap().insert(path.to_string());
    }
}

#[async_trait]
impl RemoteFs for StubFs {
    async fn read_to_string(&self, path: &str) -> Result<String, ReadError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::new(path, "no such file"))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, ReadError> {
        self.dirs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::new(path, "no such directory"))
    }

    async fn capacity(&self, path: &str) -> Result<FsCapacity, ReadError> {
        self.capacities
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .ok_or_else(|| ReadError::new(path, "statfs unavailable"))
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.extra_paths.lock().unwrap().contains(path)
    }
}

pub struct StubSession {
    fs: Arc<StubFs>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteSession for StubSession {
    fn fs(&self) -> Arc<dyn RemoteFs> {
        self.fs.clone()
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out `StubSession`s over a shared `StubFs` and records how
/// often it was asked to dial and how often sessions were closed.
pub struct StubConnector {
    fs: Arc<StubFs>,
    dials: AtomicUsize,
    closes: Arc<AtomicUsize>,
    fail_dials: AtomicBool,
}

impl StubConnector {
    pub fn new(fs: Arc<StubFs>) -> Arc<Self> {
        Arc::new(Self {
            fs,
            dials: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_dials: AtomicBool::new(false),
        })
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_dials(&self, fail: bool) {
        self.fail_dials.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteConnector for StubConnector {
    async fn dial(
        &self,
        target: &HostIdentity,
        _passwd: &str,
        _timeout: Duration,
    ) -> Result<Arc<dyn RemoteSession>, ConnectError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if self.fail_dials.load(Ordering::SeqCst) {
            return Err(ConnectError::Tcp {
                addr: target.addr(),
                reason: "connector set to fail".to_string(),
            });
        }
        Ok(Arc::new(StubSession {
            fs: self.fs.clone(),
            closes: self.closes.clone(),
        }))
    }
}

pub fn target(host: &str) -> HostIdentity {
    HostIdentity::new(22, host, "ops")
}

/// One-second cadences everywhere so tests observe ticks quickly.
pub fn fast_config() -> MonitorConfig {
    MonitorConfig::load_from_str(
        r#"
[connect]
dial_timeout_secs = 1

[poll]
cpu_topology_secs = 1
cpu_utilization_secs = 1
memory_secs = 1
uptime_secs = 1
loadavg_secs = 1
net_dev_secs = 1
net_proto_secs = 1
temperature_secs = 1
disk_secs = 1
process_secs = 1
summary_secs = 1

[process]
top_n = 10
read_concurrency = 4
"#,
    )
    .expect("test config")
}

/// A `StubFs` primed with a small but internally consistent snapshot of
/// every file the collectors read.
pub fn seeded_fs() -> Arc<StubFs> {
    let fs = Arc::new(StubFs::default());

    fs.put_file(
        "/proc/cpuinfo",
        "\
processor\t: 0
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
stepping\t: 10
cpu MHz\t\t: 1800.000
cache size\t: 6144 KB
physical id\t: 0
siblings\t: 2
core id\t\t: 0
cpu cores\t: 2
apicid\t\t: 0
fpu\t\t: yes
fpu_exception\t: yes
bogomips\t: 3600.00
clflush size\t: 64
cache_alignment\t: 64
address sizes\t: 39 bits physical, 48 bits virtual

processor\t: 1
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
stepping\t: 10
cpu MHz\t\t: 1800.000
cache size\t: 6144 KB
physical id\t: 0
siblings\t: 2
core id\t\t: 1
cpu cores\t: 2
apicid\t\t: 2
fpu\t\t: yes
fpu_exception\t: yes
bogomips\t: 3600.00
clflush size\t: 64
cache_alignment\t: 64
address sizes\t: 39 bits physical, 48 bits virtual
",
    );

    fs.put_file(
        "/proc/stat",
        "\
cpu  1000 50 300 8000 120 0 30 0 0 0
cpu0 500 25 150 4000 60 0 15 0 0 0
cpu1 500 25 150 4000 60 0 15 0 0 0
ctxt 123456
btime 1718000000
processes 4242
procs_running 2
procs_blocked 0
",
    );

    // 4194304 kB = 4 GB exactly, free is one quarter of it
    fs.put_file(
        "/proc/meminfo",
        "\
MemTotal:        4194304 kB
MemFree:         1048576 kB
MemAvailable:    2097152 kB
Buffers:          131072 kB
Cached:           524288 kB
SwapCached:         8192 kB
Dirty:              4096 kB
SwapTotal:       1048576 kB
SwapFree:         786432 kB
",
    );

    // 86400 + 7200 + 180 + 4 = one day, two hours, three minutes, four seconds
    fs.put_file("/proc/uptime", "93784.00 180000.00\n");
    fs.put_file("/proc/loadavg", "0.50 0.40 0.30 2/345 6789\n");

    fs.put_file(
        "/proc/net/dev",
        "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  100000    1000    0    0    0     0          0         0   100000    1000    0    0    0     0       0          0
  eth0: 5000000   40000    0    0    0     0          0         0  2500000   30000    0    0    0     0       0          0
",
    );
    // 192.168.1.0/24 directly on eth0 plus a gatewayed default route
    fs.put_file(
        "/proc/net/route",
        "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0
eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0
",
    );
    fs.put_file(
        "/proc/net/fib_trie",
        "\
Main:
  +-- 0.0.0.0/0 3 0 5
     |-- 0.0.0.0
        /0 universe UNICAST
Local:
  +-- 192.168.1.0/24 2 0 2
     |-- 192.168.1.20
        /32 host LOCAL
     |-- 192.168.1.255
        /32 link BROADCAST
",
    );
    fs.mark_present("/sys/devices/virtual/net/lo");
    fs.put_file(
        "/proc/net/snmp",
        "\
Ip: Forwarding DefaultTTL InReceives
Ip: 1 64 99999
Tcp: RtoAlgorithm RtoMin RtoMax MaxConn ActiveOpens PassiveOpens AttemptFails EstabResets CurrEstab InSegs OutSegs RetransSegs InErrs OutRsts InCsumErrors
Tcp: 1 200 120000 -1 100 50 5 2 10 5000 4000 40 0 0 0
Udp: InDatagrams NoPorts InErrors OutDatagrams RcvbufErrors SndbufErrors InCsumErrors IgnoredMulti
Udp: 800 0 0 600 1 2 0 0
",
    );

    fs.put_file("/sys/class/thermal/thermal_zone0/temp", "45000\n");
    fs.put_file("/sys/class/thermal/thermal_zone1/temp", "47000\n");

    fs.put_file(
        "/proc/mounts",
        "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sdb1 /data xfs rw,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
",
    );
    fs.put_file(
        "/proc/diskstats",
        "\
   8       0 sda 5000 100 400000 3000 2000 50 160000 1500 0 2500 4500
   8       1 sda1 4800 90 380000 2900 1900 45 150000 1400 0 2400 4300
   8      16 sdb 1000 10 80000 600 500 5 40000 300 0 700 900
   8      17 sdb1 900 8 76000 580 480 4 38000 280 0 680 880
",
    );
    fs.put_capacity(
        "/",
        FsCapacity {
            blocks: 100_000,
            bfree: 25_000,
            bsize: 4096,
        },
    );
    fs.put_capacity(
        "/data",
        FsCapacity {
            blocks: 50_000,
            bfree: 40_000,
            bsize: 4096,
        },
    );

    fs.put_dir("/proc", &["1", "42", "self", "stat", "net"]);
    fs.put_file(
        "/proc/1/stat",
        "1 (systemd) S 0 1 1 0 -1 4194560 2500 0 0 0 150 50 30 20 20 0 1 0 30 100000000 500 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0\n",
    );
    fs.put_file("/proc/1/statm", "25000 800 300 50 0 1200 0\n");
    fs.put_file(
        "/proc/42/stat",
        "42 (nginx) S 1 42 42 0 -1 4194560 900 0 0 0 400 100 0 0 20 0 4 0 60 200000000 2000 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0\n",
    );
    fs.put_file("/proc/42/statm", "50000 2000 600 80 0 3000 0\n");

    fs
}
