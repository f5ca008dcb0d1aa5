// Subscriber registration types and the keyed callback set

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::{
    CpuTopologyMessage, CpuUtilizationMessage, DiskMessage, LoadAvgMessage, MemoryMessage,
    NetInterfacesMessage, NetProtoMessage, ProcessMessage, SummaryMessage, TempMessage,
    UptimeMessage,
};

/// Callback invoked with every update of one metric. Runs on the
/// poller task, so it should return quickly.
pub type MetricCallback<M> = Arc<dyn Fn(&M) + Send + Sync>;

/// The metric families a session collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CpuTopology,
    CpuUtilization,
    Memory,
    Uptime,
    LoadAvg,
    NetDev,
    NetProto,
    Temperature,
    Disk,
    Process,
    Summary,
}

impl MetricKind {
    pub const ALL: [MetricKind; 11] = [
        MetricKind::CpuTopology,
        MetricKind::CpuUtilization,
        MetricKind::Memory,
        MetricKind::Uptime,
        MetricKind::LoadAvg,
        MetricKind::NetDev,
        MetricKind::NetProto,
        MetricKind::Temperature,
        MetricKind::Disk,
        MetricKind::Process,
        MetricKind::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CpuTopology => "cpu_topology",
            MetricKind::CpuUtilization => "cpu_utilization",
            MetricKind::Memory => "memory",
            MetricKind::Uptime => "uptime",
            MetricKind::LoadAvg => "loadavg",
            MetricKind::NetDev => "net_dev",
            MetricKind::NetProto => "net_proto",
            MetricKind::Temperature => "temperature",
            MetricKind::Disk => "disk",
            MetricKind::Process => "process",
            MetricKind::Summary => "summary",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed callback for one metric kind; the registration payload.
pub enum MetricListener {
    CpuTopology(MetricCallback<CpuTopologyMessage>),
    CpuUtilization(MetricCallback<CpuUtilizationMessage>),
    Memory(MetricCallback<MemoryMessage>),
    Uptime(MetricCallback<UptimeMessage>),
    LoadAvg(MetricCallback<LoadAvgMessage>),
    NetDev(MetricCallback<NetInterfacesMessage>),
    NetProto(MetricCallback<NetProtoMessage>),
    Temperature(MetricCallback<TempMessage>),
    Disk(MetricCallback<DiskMessage>),
    Process(MetricCallback<ProcessMessage>),
    Summary(MetricCallback<SummaryMessage>),
}

macro_rules! listener_ctor {
    ($fn_name:ident, $variant:ident, $message:ty) => {
        pub fn $fn_name(callback: impl Fn(&$message) + Send + Sync + 'static) -> Self {
            MetricListener::$variant(Arc::new(callback))
        }
    };
}

impl MetricListener {
    listener_ctor!(on_cpu_topology, CpuTopology, CpuTopologyMessage);
    listener_ctor!(on_cpu_utilization, CpuUtilization, CpuUtilizationMessage);
    listener_ctor!(on_memory, Memory, MemoryMessage);
    listener_ctor!(on_uptime, Uptime, UptimeMessage);
    listener_ctor!(on_loadavg, LoadAvg, LoadAvgMessage);
    listener_ctor!(on_net_dev, NetDev, NetInterfacesMessage);
    listener_ctor!(on_net_proto, NetProto, NetProtoMessage);
    listener_ctor!(on_temperature, Temperature, TempMessage);
    listener_ctor!(on_disk, Disk, DiskMessage);
    listener_ctor!(on_process, Process, ProcessMessage);
    listener_ctor!(on_summary, Summary, SummaryMessage);

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricListener::CpuTopology(_) => MetricKind::CpuTopology,
            MetricListener::CpuUtilization(_) => MetricKind::CpuUtilization,
            MetricListener::Memory(_) => MetricKind::Memory,
            MetricListener::Uptime(_) => MetricKind::Uptime,
            MetricListener::LoadAvg(_) => MetricKind::LoadAvg,
            MetricListener::NetDev(_) => MetricKind::NetDev,
            MetricListener::NetProto(_) => MetricKind::NetProto,
            MetricListener::Temperature(_) => MetricKind::Temperature,
            MetricListener::Disk(_) => MetricKind::Disk,
            MetricListener::Process(_) => MetricKind::Process,
            MetricListener::Summary(_) => MetricKind::Summary,
        }
    }
}

impl std::fmt::Debug for MetricListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MetricListener").field(&self.kind()).finish()
    }
}

/// Keyed callbacks for one metric kind. Fan-out walks a point-in-time
/// snapshot of the callbacks so a callback is free to register or
/// remove subscriptions from inside the call.
pub struct ListenerSet<M> {
    callbacks: RwLock<HashMap<String, MetricCallback<M>>>,
}

impl<M> Default for ListenerSet<M> {
    fn default() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }
}

impl<M> ListenerSet<M> {
    pub fn insert(&self, key: impl Into<String>, callback: MetricCallback<M>) {
        if let Ok(mut map) = self.callbacks.write() {
            map.insert(key.into(), callback);
        }
    }

    /// Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        if let Ok(mut map) = self.callbacks.write() {
            map.remove(key);
        }
    }

    pub fn emit(&self, message: &M) {
        let snapshot: Vec<MetricCallback<M>> = match self.callbacks.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return,
        };
        for callback in snapshot {
            callback(message);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.callbacks
            .read()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().map(|map| map.len()).unwrap_or(0)
    }
}
