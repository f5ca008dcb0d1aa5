// Network interface and protocol counter models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HostIdentity;

/// Per-interface traffic with an aggregate over physical interfaces.
/// Speeds are rates derived from two samples; cumulative counters come
/// from the newest sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetInterfacesMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub total: NetDevTotal,
    pub interfaces: BTreeMap<String, NetDev>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetDevTotal {
    pub up_bytes_h: f64,
    pub up_bytes_h_unit: String,
    pub up_bytes: i64,
    pub down_bytes_h: f64,
    pub down_bytes_h_unit: String,
    pub down_bytes: i64,
    pub up_packets: i64,
    pub down_packets: i64,
    pub up_speed: f64,
    pub up_speed_unit: String,
    pub down_speed: f64,
    pub down_speed_unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetDev {
    pub name: String,
    /// Addresses assigned to this interface, from the routing table
    /// intersected with locally-held trie nodes.
    pub ip: Vec<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub up_bytes_h: f64,
    pub up_bytes_h_unit: String,
    pub up_bytes: i64,
    pub down_bytes_h: f64,
    pub down_bytes_h_unit: String,
    pub down_bytes: i64,
    pub up_packets: i64,
    pub down_packets: i64,
    pub up_speed: f64,
    pub up_speed_unit: String,
    pub down_speed: f64,
    pub down_speed_unit: String,
}

/// TCP/UDP counters from the snmp table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetProtoMessage {
    #[serde(flatten)]
    pub origin: HostIdentity,
    pub sampled_at: u64,
    pub tcp: TcpCounters,
    pub udp: UdpCounters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpCounters {
    pub active_opens: i64,
    pub passive_opens: i64,
    pub fail_opens: i64,
    pub curr_conn: i64,
    pub in_segments: i64,
    pub out_segments: i64,
    pub retrans_segments: i64,
    /// Retransmitted over sent segments; zero when nothing was sent.
    pub retrans_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UdpCounters {
    pub in_datagrams: i64,
    pub out_datagrams: i64,
    pub receive_buf_errors: i64,
    pub send_buf_errors: i64,
}
