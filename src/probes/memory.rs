// Memory collector

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PollError;
use crate::models::{HostIdentity, MemoryMessage, SummaryMemory, now_epoch_ms};
use crate::parsers::parse_meminfo;
use crate::remote::RemoteFs;
use crate::state::ParserState;
use crate::subscribe::MetricKind;

use super::MetricProbe;

const MEMINFO: &str = "/proc/meminfo";

pub struct MemoryProbe {
    target: HostIdentity,
    interval: Duration,
    state: Arc<ParserState>,
}

impl MemoryProbe {
    pub fn new(target: HostIdentity, interval: Duration, state: Arc<ParserState>) -> Self {
        Self {
            target,
            interval,
            state,
        }
    }
}

#[async_trait]
impl MetricProbe for MemoryProbe {
    type Output = MemoryMessage;

    fn kind(&self) -> MetricKind {
        MetricKind::Memory
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn sample(&mut self, fs: &Arc<dyn RemoteFs>) -> Result<Option<MemoryMessage>, PollError> {
        let text = fs.read_to_string(MEMINFO).await?;
        let mut message = parse_meminfo(&text);
        message.origin = self.target.clone();
        message.sampled_at = now_epoch_ms();

        self.state.record_memory(SummaryMemory {
            free_mem_occupy: message.free_mem_occupy,
            available_mem_occupy: message.available_mem_occupy,
            swap_free_occupy: message.swap_free_occupy,
        });
        Ok(Some(message))
    }
}
