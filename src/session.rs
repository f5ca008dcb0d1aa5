// One live remote session: the connection plus its eleven pollers

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::MonitorConfig;
use crate::error::ConnectError;
use crate::models::{
    CpuTopologyMessage, CpuUtilizationMessage, DiskMessage, HostIdentity, LoadAvgMessage,
    MemoryMessage, NetInterfacesMessage, NetProtoMessage, ProcessMessage, SummaryMessage,
    TempMessage, UptimeMessage,
};
use crate::poller::Poller;
use crate::probes::{
    CpuTopologyProbe, CpuUtilizationProbe, DiskProbe, LoadAvgProbe, MemoryProbe, NetDevProbe,
    NetProtoProbe, ProcessProbe, SummaryProbe, TempProbe, UptimeProbe,
};
use crate::remote::{RemoteConnector, RemoteSession};
use crate::state::ParserState;
use crate::subscribe::{MetricKind, MetricListener};

/// A dialed connection with every collector running. All collectors
/// start at session creation; whether anyone listens to a given kind
/// only affects fan-out, not collection.
pub struct HostSession {
    target: HostIdentity,
    remote: Arc<dyn RemoteSession>,
    cancel: CancellationToken,
    cpu_topology: Poller<CpuTopologyMessage>,
    cpu_utilization: Poller<CpuUtilizationMessage>,
    memory: Poller<MemoryMessage>,
    uptime: Poller<UptimeMessage>,
    loadavg: Poller<LoadAvgMessage>,
    net_dev: Poller<NetInterfacesMessage>,
    net_proto: Poller<NetProtoMessage>,
    temperature: Poller<TempMessage>,
    disk: Poller<DiskMessage>,
    process: Poller<ProcessMessage>,
    summary: Poller<SummaryMessage>,
}

impl HostSession {
    /// Dial the target and start all collectors. A dial failure leaves
    /// nothing behind.
    pub async fn open(
        connector: &dyn RemoteConnector,
        target: &HostIdentity,
        passwd: &str,
        config: &MonitorConfig,
    ) -> Result<Arc<Self>, ConnectError> {
        let remote = connector
            .dial(
                target,
                passwd,
                Duration::from_secs(config.connect.dial_timeout_secs),
            )
            .await?;
        let fs = remote.fs();
        let state = Arc::new(ParserState::default());
        let cancel = CancellationToken::new();
        let poll = &config.poll;
        let secs = Duration::from_secs;

        let session = HostSession {
            cpu_topology: Poller::spawn(
                CpuTopologyProbe::new(target.clone(), secs(poll.cpu_topology_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            cpu_utilization: Poller::spawn(
                CpuUtilizationProbe::new(
                    target.clone(),
                    secs(poll.cpu_utilization_secs),
                    state.clone(),
                ),
                fs.clone(),
                cancel.clone(),
            ),
            memory: Poller::spawn(
                MemoryProbe::new(target.clone(), secs(poll.memory_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            uptime: Poller::spawn(
                UptimeProbe::new(target.clone(), secs(poll.uptime_secs)),
                fs.clone(),
                cancel.clone(),
            ),
            loadavg: Poller::spawn(
                LoadAvgProbe::new(target.clone(), secs(poll.loadavg_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            net_dev: Poller::spawn(
                NetDevProbe::new(target.clone(), secs(poll.net_dev_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            net_proto: Poller::spawn(
                NetProtoProbe::new(target.clone(), secs(poll.net_proto_secs)),
                fs.clone(),
                cancel.clone(),
            ),
            temperature: Poller::spawn(
                TempProbe::new(target.clone(), secs(poll.temperature_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            disk: Poller::spawn(
                DiskProbe::new(target.clone(), secs(poll.disk_secs), state.clone()),
                fs.clone(),
                cancel.clone(),
            ),
            process: Poller::spawn(
                ProcessProbe::new(
                    target.clone(),
                    secs(poll.process_secs),
                    state.clone(),
                    config.process.top_n,
                    config.process.read_concurrency,
                ),
                fs.clone(),
                cancel.clone(),
            ),
            summary: Poller::spawn(
                SummaryProbe::new(target.clone(), secs(poll.summary_secs), state),
                fs,
                cancel.clone(),
            ),
            target: target.clone(),
            remote,
            cancel,
        };
        debug!(host = %session.target, "session opened, all collectors running");
        Ok(Arc::new(session))
    }

    pub fn target(&self) -> &HostIdentity {
        &self.target
    }

    /// Attach a callback under `key`. Registering the same key for the
    /// same kind replaces the previous callback.
    pub fn register(&self, key: &str, listener: MetricListener) {
        match listener {
            MetricListener::CpuTopology(cb) => self.cpu_topology.listeners().insert(key, cb),
            MetricListener::CpuUtilization(cb) => self.cpu_utilization.listeners().insert(key, cb),
            MetricListener::Memory(cb) => self.memory.listeners().insert(key, cb),
            MetricListener::Uptime(cb) => self.uptime.listeners().insert(key, cb),
            MetricListener::LoadAvg(cb) => self.loadavg.listeners().insert(key, cb),
            MetricListener::NetDev(cb) => self.net_dev.listeners().insert(key, cb),
            MetricListener::NetProto(cb) => self.net_proto.listeners().insert(key, cb),
            MetricListener::Temperature(cb) => self.temperature.listeners().insert(key, cb),
            MetricListener::Disk(cb) => self.disk.listeners().insert(key, cb),
            MetricListener::Process(cb) => self.process.listeners().insert(key, cb),
            MetricListener::Summary(cb) => self.summary.listeners().insert(key, cb),
        }
    }

    /// Detach `key` from one kind; absent keys are a no-op.
    pub fn remove(&self, kind: MetricKind, key: &str) {
        match kind {
            MetricKind::CpuTopology => self.cpu_topology.listeners().remove(key),
            MetricKind::CpuUtilization => self.cpu_utilization.listeners().remove(key),
            MetricKind::Memory => self.memory.listeners().remove(key),
            MetricKind::Uptime => self.uptime.listeners().remove(key),
            MetricKind::LoadAvg => self.loadavg.listeners().remove(key),
            MetricKind::NetDev => self.net_dev.listeners().remove(key),
            MetricKind::NetProto => self.net_proto.listeners().remove(key),
            MetricKind::Temperature => self.temperature.listeners().remove(key),
            MetricKind::Disk => self.disk.listeners().remove(key),
            MetricKind::Process => self.process.listeners().remove(key),
            MetricKind::Summary => self.summary.listeners().remove(key),
        }
    }

    /// Detach `key` from every kind.
    pub fn remove_everywhere(&self, key: &str) {
        for kind in MetricKind::ALL {
            self.remove(kind, key);
        }
    }

    /// The eviction test: does anyone, of any kind, still listen?
    pub fn has_any_subscriber(&self) -> bool {
        self.subscriber_count() > 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.cpu_topology.listeners().len()
            + self.cpu_utilization.listeners().len()
            + self.memory.listeners().len()
            + self.uptime.listeners().len()
            + self.loadavg.listeners().len()
            + self.net_dev.listeners().len()
            + self.net_proto.listeners().len()
            + self.temperature.listeners().len()
            + self.disk.listeners().len()
            + self.process.listeners().len()
            + self.summary.listeners().len()
    }

    /// Stop every collector, wait for them, then drop the connection.
    /// The session pool calls this at most once per session.
    pub async fn close(&self) {
        self.cancel.cancel();
        self.cpu_topology.join().await;
        self.cpu_utilization.join().await;
        self.memory.join().await;
        self.uptime.join().await;
        self.loadavg.join().await;
        self.net_dev.join().await;
        self.net_proto.join().await;
        self.temperature.join().await;
        self.disk.join().await;
        self.process.join().await;
        self.summary.join().await;
        self.remote.close().await;
        debug!(host = %self.target, "session closed");
    }
}
