// Metric message types (field sets follow the richest upstream wire shape)

mod cpu;
mod host;
mod memory;
mod network;
mod process;
mod storage;
mod summary;
mod system;

pub use cpu::{
    CoreUtilization, CpuCore, CpuPackage, CpuTopologyMessage, CpuUtilizationMessage,
    CpuUtilizationTotal, LogicalCpu,
};
pub use host::HostIdentity;
pub use memory::MemoryMessage;
pub use network::{
    NetDev, NetDevTotal, NetInterfacesMessage, NetProtoMessage, TcpCounters, UdpCounters,
};
pub use process::{Process, ProcessMessage};
pub use storage::{Disk, DiskMessage};
pub use summary::{
    SummaryCpu, SummaryDisk, SummaryLoad, SummaryMemory, SummaryMessage, SummaryNet, SummaryTemp,
};
pub use system::{LoadAvgMessage, TempMessage, UptimeMessage};

/// Epoch milliseconds for message timestamps.
pub(crate) fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
