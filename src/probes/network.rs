// Network interface and protocol collectors

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::PollError;
use crate::models::{
    HostIdentity, NetDev, NetDevTotal, NetInterfacesMessage, NetProtoMessage, SummaryNet,
    now_epoch_ms,
};
use crate::parsers::{
    assign_interface_ips, parse_fib_local_addrs, parse_net_dev, parse_route_subnets, parse_snmp,
    scale_bytes, scale_rate,
};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::{MetricProbe, SampleWindow, elapsed_ms};

const NET_DEV: &str = "/proc/net/dev";
const NET_ROUTE: &str = "/proc/net/route";
const FIB_TRIE: &str = "/proc/net/fib_trie";
const SNMP: &str = "/proc/net/snmp";

/// Per-interface counters, two-sample speeds, address assignment from
/// the routing table, and a physical-only aggregate. An interface is
/// virtual when the kernel files it under `/sys/devices/virtual/net`.
pub struct NetDevProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
    window: SampleWindow,
}

impl NetDevProbe {
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
impl MetricProbe for NetDevProbe {
    type Output = NetInterfacesMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::NetDev
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<NetInterfacesMessage>, PollError> {
        let text = fs.read_to_string(NET_DEV).await?;
        let now = Instant::now();

        let prev = self
            .window
            .get()
            .map(|(raw, at)| (parse_net_dev(raw), at));
        let new_devs = parse_net_dev(&text);
        self.window.advance(text, now);

        if new_devs.is_empty() {
            return Err(PollError::parse(NET_DEV, "no interface rows"));
        }
        let Some((old_devs, old_at)) = prev else {
            return Ok(None);
        };
        let elapsed = elapsed_ms(old_at, now);

        // address assignment degrades to "no addresses" when either
        // auxiliary table is unreadable
        let route_text = match fs.read_to_string(NET_ROUTE).await {
            Ok(t) => t,
            Err(e) => {
                debug!(error = %e, "route table unavailable");
                String::new()
            }
        };
        let fib_text = match fs.read_to_string(FIB_TRIE).await {
            Ok(t) => t,
            Err(e) => {
                debug!(error = %e, "fib trie unavailable");
                String::new()
            }
        };
        let assigned = assign_interface_ips(
            &parse_route_subnets(&route_text),
            &parse_fib_local_addrs(&fib_text),
        );

        let mut interfaces = BTreeMap::new();
        let (mut up_bytes, mut down_bytes) = (0i64, 0i64);
        let (mut up_packets, mut down_packets) = (0i64, 0i64);
        let (mut up_speed_raw, mut down_speed_raw) = (0.0f64, 0.0f64);

        for (name, new_c) in &new_devs {
            let is_virtual = fs
                .exists(&format!("/sys/devices/virtual/net/{name}"))
                .await;
            // an interface that appeared mid-window gets zero speeds
            let old_c = old_devs.get(name).copied().unwrap_or(*new_c);

            let dev_up_speed = (new_c.up_bytes - old_c.up_bytes) as f64 * 1000.0 / elapsed as f64;
            let dev_down_speed =
                (new_c.down_bytes - old_c.down_bytes) as f64 * 1000.0 / elapsed as f64;

            let (up_bytes_h, up_bytes_h_unit) = scale_bytes(new_c.up_bytes as f64);
            let (down_bytes_h, down_bytes_h_unit) = scale_bytes(new_c.down_bytes as f64);
            let (up_speed, up_speed_unit) = scale_rate(dev_up_speed);
            let (down_speed, down_speed_unit) = scale_rate(dev_down_speed);

            if !is_virtual {
                up_bytes += new_c.up_bytes;
                down_bytes += new_c.down_bytes;
                up_packets += new_c.up_packets;
                down_packets += new_c.down_packets;
                up_speed_raw += dev_up_speed;
                down_speed_raw += dev_down_speed;
            }

            interfaces.insert(
                name.clone(),
                NetDev {
                    name: name.clone(),
                    ip: assigned.get(name).cloned().unwrap_or_default(),
                    is_virtual,
                    up_bytes_h,
                    up_bytes_h_unit,
                    up_bytes: new_c.up_bytes,
                    down_bytes_h,
                    down_bytes_h_unit,
                    down_bytes: new_c.down_bytes,
                    up_packets: new_c.up_packets,
                    down_packets: new_c.down_packets,
                    up_speed,
                    up_speed_unit,
                    down_speed,
                    down_speed_unit,
                },
            );
        }

        let (up_bytes_h, up_bytes_h_unit) = scale_bytes(up_bytes as f64);
        let (down_bytes_h, down_bytes_h_unit) = scale_bytes(down_bytes as f64);
        let (up_speed, up_speed_unit) = scale_rate(up_speed_raw);
        let (down_speed, down_speed_unit) = scale_rate(down_speed_raw);

        self.state.record_net(SummaryNet {
            up_bytes_h,
            up_bytes_h_unit: up_bytes_h_unit.clone(),
            down_bytes_h,
            down_bytes_h_unit: down_bytes_h_unit.clone(),
            up_speed,
            up_speed_unit: up_speed_unit.clone(),
            down_speed,
            down_speed_unit: down_speed_unit.clone(),
        });

        Ok(Some(NetInterfacesMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            total: NetDevTotal {
                up_bytes_h,
                up_bytes_h_unit,
                up_bytes,
                down_bytes_h,
                down_bytes_h_unit,
                down_bytes,
                up_packets,
                down_packets,
                up_speed,
                up_speed_unit,
                down_speed,
                down_speed_unit,
            },
            interfaces,
        }))
    }
}

/// TCP/UDP protocol counters; a single-sample read.
pub struct NetProtoProbe {
    target: HostIdentity,
    interval: Duration,
}

impl NetProtoProbe {
    pub fn new(target: HostIdentity, interval: Duration) -> Self {
        Self { target, interval }
    }
}

#[async_trait]
impl MetricProbe for NetProtoProbe {
    type Output = NetProtoMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::NetProto
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<NetProtoMessage>, PollError> {
        let text = fs.read_to_string(SNMP).await?;
        let (tcp, udp) =
            parse_snmp(&text).ok_or_else(|| PollError::parse(SNMP, "no Tcp/Udp tables"))?;
        Ok(Some(NetProtoMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            tcp,
            udp,
        }))
    }
}
