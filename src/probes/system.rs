// Uptime, load average and thermal collectors

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PollError;
use crate::models::{
    HostIdentity, LoadAvgMessage, SummaryLoad, TempMessage, UptimeMessage, now_epoch_ms,
};
use crate::parsers::{parse_loadavg, parse_temp_millidegrees, parse_uptime};
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::MetricProbe;

const UPTIME: &str = "/proc/uptime";
const LOADAVG: &str = "/proc/loadavg";

pub struct UptimeProbe {
    target: HostIdentity,
    interval: Duration,
}

impl UptimeProbe {
    pub fn new(target: HostIdentity, interval: Duration) -> Self {
        Self { target, interval }
    }
}

#[async_trait]
impl MetricProbe for UptimeProbe {
    type Output = UptimeMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Uptime
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(&mut self, fs: &Arc<dyn RemoteFs>) -> Result<Option<UptimeMessage>, PollError> {
        let text = fs.read_to_string(UPTIME).await?;
        let mut message = parse_uptime(&text)
            .ok_or_else(|| PollError::parse(UPTIME, "first field is not a number"))?;
        message.origin = self.target.clone();
        message.sampled_at = now_epoch_ms();
        Ok(Some(message))
    }
}

/// Load averages need the logical CPU count for their occupancy ratios,
/// so nothing is emitted until the topology collector has seeded it.
pub struct LoadAvgProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
}

impl LoadAvgProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
        }
    }
}

#[async_trait]
impl MetricProbe for LoadAvgProbe {
    type Output = LoadAvgMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::LoadAvg
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(
        &mut self,
        fs: &Arc<dyn RemoteFs>,
    ) -> Result<Option<LoadAvgMessage>, PollError> {
        let logical_cpus = self.state.logical_cpus();
        if logical_cpus == 0 {
            return Ok(None);
        }

        let text = fs.read_to_string(LOADAVG).await?;
        let mut message = parse_loadavg(&text, logical_cpus)
            .ok_or_else(|| PollError::parse(LOADAVG, "load fields are not numbers"))?;
        message.origin = self.target.clone();
        message.sampled_at = now_epoch_ms();

        self.state.record_loadavg(SummaryLoad {
            one_occupy: message.one_occupy,
            five_occupy: message.five_occupy,
            fifteen_occupy: message.fifteen_occupy,
        });
        Ok(Some(message))
    }
}

/// Zone 0 is required; further zones are probed upward until the first
/// one that is missing or unreadable.
pub struct TempProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
}

impl TempProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
        }
    }

    fn zone_path(index: u32) -> String {
        format!("/sys/class/thermal/thermal_zone{index}/temp")
    }
}

#[async_trait]
impl MetricProbe for TempProbe {
    type Output = TempMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Temperature
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(&mut self, fs: &Arc<dyn RemoteFs>) -> Result<Option<TempMessage>, PollError> {
        let zone0 = Self::zone_path(0);
        let text = fs.read_to_string(&zone0).await?;
        let degrees = parse_temp_millidegrees(&text)
            .ok_or_else(|| PollError::parse(zone0.as_str(), "not a millidegree integer"))?;

        let mut zones = BTreeMap::new();
        zones.insert("thermal_zone0".to_string(), degrees);
        let mut highest = degrees;

        for index in 1..10 {
            let Ok(text) = fs.read_to_string(&Self::zone_path(index)).await else {
                break;
            };
            let Some(degrees) = parse_temp_millidegrees(&text) else {
                break;
            };
            zones.insert(format!("thermal_zone{index}"), degrees);
            highest = highest.max(degrees);
        }

        self.state.record_highest_temp(highest);
        Ok(Some(TempMessage {
            origin: self.target.clone(),
            sampled_at: now_epoch_ms(),
            zones,
        }))
    }
}
