use serde::Deserialize;

/// Collector settings. Every field has a default, so an empty TOML
/// document (or `MonitorConfig::default()`) is a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub connect: ConnectConfig,
    pub poll: PollConfig,
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    pub dial_timeout_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            dial_timeout_secs: 5,
        }
    }
}

/// Per-kind poll cadences in seconds. Topology moves slowly and polls
/// on a long cadence; the process ranking is the most expensive
/// collection and gets a slower beat than the plain counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub cpu_topology_secs: u64,
    pub cpu_utilization_secs: u64,
    pub memory_secs: u64,
    pub uptime_secs: u64,
    pub loadavg_secs: u64,
    pub net_dev_secs: u64,
    pub net_proto_secs: u64,
    pub temperature_secs: u64,
    pub disk_secs: u64,
    pub process_secs: u64,
    pub summary_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            cpu_topology_secs: 10,
            cpu_utilization_secs: 2,
            memory_secs: 2,
            uptime_secs: 2,
            loadavg_secs: 2,
            net_dev_secs: 2,
            net_proto_secs: 2,
            temperature_secs: 2,
            disk_secs: 2,
            process_secs: 5,
            summary_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// How many ranked processes each report carries.
    pub top_n: usize,
    /// Parallel in-flight per-PID reads while snapshotting.
    pub read_concurrency: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            top_n: 50,
            read_concurrency: 10,
        }
    }
}

impl MonitorConfig {
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: MonitorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.connect.dial_timeout_secs > 0,
            "connect.dial_timeout_secs must be > 0, got {}",
            self.connect.dial_timeout_secs
        );
        let cadences = [
            ("poll.cpu_topology_secs", self.poll.cpu_topology_secs),
            ("poll.cpu_utilization_secs", self.poll.cpu_utilization_secs),
            ("poll.memory_secs", self.poll.memory_secs),
            ("poll.uptime_secs", self.poll.uptime_secs),
            ("poll.loadavg_secs", self.poll.loadavg_secs),
            ("poll.net_dev_secs", self.poll.net_dev_secs),
            ("poll.net_proto_secs", self.poll.net_proto_secs),
            ("poll.temperature_secs", self.poll.temperature_secs),
            ("poll.disk_secs", self.poll.disk_secs),
            ("poll.process_secs", self.poll.process_secs),
            ("poll.summary_secs", self.poll.summary_secs),
        ];
        for (name, secs) in cadences {
            anyhow::ensure!(secs > 0, "{} must be > 0, got {}", name, secs);
        }
        anyhow::ensure!(
            self.process.top_n > 0,
            "process.top_n must be > 0, got {}",
            self.process.top_n
        );
        anyhow::ensure!(
            self.process.read_concurrency > 0,
            "process.read_concurrency must be > 0, got {}",
            self.process.read_concurrency
        );
        Ok(())
    }
}
