// net/dev, route, fib_trie and snmp parsing

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

use crate::models::{TcpCounters, UdpCounters};

/// Cumulative counters for one interface from `/proc/net/dev`; down is
/// the receive side, up the transmit side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevCounters {
    pub down_bytes: i64,
    pub down_packets: i64,
    pub up_bytes: i64,
    pub up_packets: i64,
}

/// Parse the 16-column `/proc/net/dev` table. Header lines carry no
/// colon-terminated interface name and fall out naturally; rows with
/// too few columns or malformed counters are dropped individually.
pub fn parse_net_dev(text: &str) -> BTreeMap<String, DevCounters> {
    let mut devices = BTreeMap::new();
    for line in text.lines() {
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || name.contains(' ') {
            continue;
        }
        let fields: Vec<i64> = counters
            .split_whitespace()
            .map_while(|f| f.parse().ok())
            .collect();
        if fields.len() < 10 {
            continue;
        }
        devices.insert(
            name.to_string(),
            DevCounters {
                down_bytes: fields[0],
                down_packets: fields[1],
                up_bytes: fields[8],
                up_packets: fields[9],
            },
        );
    }
    devices
}

/// Parse `/proc/net/route` and keep the directly-connected rows
/// (gateway all-zero): these give the subnets an interface actually
/// owns an address on. Destination and mask are little-endian hex in
/// the file and are returned in network order.
pub fn parse_route_subnets(text: &str) -> BTreeMap<String, Vec<(u32, u32)>> {
    let mut subnets: BTreeMap<String, Vec<(u32, u32)>> = BTreeMap::new();
    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let hex = |idx: usize| u32::from_str_radix(fields[idx], 16).ok().map(u32::swap_bytes);
        let (Some(dest), Some(gateway), Some(mask)) = (hex(1), hex(2), hex(7)) else {
            continue;
        };
        if gateway != 0 {
            continue;
        }
        subnets
            .entry(fields[0].to_string())
            .or_default()
            .push((dest, mask));
    }
    subnets
}

/// Pull the locally-held addresses out of `/proc/net/fib_trie`: a
/// `|-- a.b.c.d` leaf followed by a `host LOCAL` annotation is an
/// address assigned to this machine.
pub fn parse_fib_local_addrs(text: &str) -> Vec<u32> {
    let mut addrs = Vec::new();
    let mut pending: Option<u32> = None;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("|--") {
            pending = rest.trim().parse::<Ipv4Addr>().ok().map(u32::from);
        } else if trimmed.contains("host LOCAL") {
            if let Some(addr) = pending.take() {
                if !addrs.contains(&addr) {
                    addrs.push(addr);
                }
            }
        }
    }
    addrs
}

/// Assign each interface the locally-held addresses that fall inside
/// one of its directly-connected subnets, skipping the 169.254.0.0/16
/// link-local block.
pub fn assign_interface_ips(
    subnets: &BTreeMap<String, Vec<(u32, u32)>>,
    local_addrs: &[u32],
) -> BTreeMap<String, Vec<String>> {
    let mut assigned = BTreeMap::new();
    for (iface, nets) in subnets {
        let mut ips = Vec::new();
        for &addr in local_addrs {
            if addr >> 16 == 0xA9FE {
                continue;
            }
            if nets.iter().any(|&(dest, mask)| addr & mask == dest) {
                let ip = Ipv4Addr::from(addr).to_string();
                if !ips.contains(&ip) {
                    ips.push(ip);
                }
            }
        }
        assigned.insert(iface.clone(), ips);
    }
    assigned
}

/// Parse `/proc/net/snmp`: each protocol contributes a header line and
/// a value line with matching prefixes; counters are resolved by column
/// name so kernel-version column drift cannot misalign them. Missing
/// columns default to zero; None only when neither the Tcp nor the Udp
/// pair is present.
pub fn parse_snmp(text: &str) -> Option<(TcpCounters, UdpCounters)> {
    let tcp = protocol_columns(text, "Tcp:");
    let udp = protocol_columns(text, "Udp:");
    if tcp.is_empty() && udp.is_empty() {
        return None;
    }

    let col = |map: &HashMap<String, i64>, name: &str| map.get(name).copied().unwrap_or(0);

    let out_segments = col(&tcp, "OutSegs");
    let retrans_segments = col(&tcp, "RetransSegs");
    let retrans_rate = if out_segments > 0 {
        retrans_segments as f64 / out_segments as f64
    } else {
        0.0
    };

    Some((
        TcpCounters {
            active_opens: col(&tcp, "ActiveOpens"),
            passive_opens: col(&tcp, "PassiveOpens"),
            fail_opens: col(&tcp, "AttemptFails"),
            curr_conn: col(&tcp, "CurrEstab"),
            in_segments: col(&tcp, "InSegs"),
            out_segments,
            retrans_segments,
            retrans_rate,
        },
        UdpCounters {
            in_datagrams: col(&udp, "InDatagrams"),
            out_datagrams: col(&udp, "OutDatagrams"),
            receive_buf_errors: col(&udp, "RcvbufErrors"),
            send_buf_errors: col(&udp, "SndbufErrors"),
        },
    ))
}

fn protocol_columns(text: &str, prefix: &str) -> HashMap<String, i64> {
    let mut rows = text.lines().filter_map(|l| l.strip_prefix(prefix));
    let (Some(header), Some(values)) = (rows.next(), rows.next()) else {
        return HashMap::new();
    };
    header
        .split_whitespace()
        .zip(values.split_whitespace())
        .filter_map(|(name, value)| Some((name.to_string(), value.parse().ok()?)))
        .collect()
}
