// Metric collectors.
//
// A probe owns everything one metric kind needs between ticks: which
// files to read, the previous raw sample for delta computation, and
// the shared parser state it feeds. The poller drives it; the pure
// text parsing lives in `crate::parsers`.

mod cpu;
mod disk;
mod memory;
mod network;
mod process;
mod summary;
mod system;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::PollError;
use crate::remote::RemoteFs;
use crate::subscribe::MetricKind;

pub use cpu::{CpuTopologyProbe, CpuUtilizationProbe};
pub use disk::DiskProbe;
pub use memory::MemoryProbe;
pub use network::{NetDevProbe, NetProtoProbe};
pub use process::ProcessProbe;
pub use summary::SummaryProbe;
pub use system::{LoadAvgProbe, TempProbe, UptimeProbe};

/// One metric collector, driven on a fixed cadence by its poller.
///
/// `Ok(None)` means "nothing to report this tick" - the first sample
/// of a delta metric, or a prerequisite (like the CPU count) not yet
/// known. Errors are logged by the poller and the schedule continues.
#[async_trait]
pub trait MetricProbe: Send {
    type Output: Clone + Send + Sync + 'static;

    fn kind(&self) -> MetricKind;

    fn interval(&self) -> Duration;

    async fn sample(&mut self, fs: &Arc<dyn RemoteFs>)
    -> Result<Option<Self::Output>, PollError>;
}

/// Previous raw text and read time of a delta metric. Advanced on every
/// successful read - even when parsing fails, so a transient bad read
/// does not freeze the window - and left untouched when the read
/// itself fails.
#[derive(Debug, Default)]
pub struct SampleWindow {
    prev: Option<(String, Instant)>,
}

impl SampleWindow {
    pub fn get(&self) -> Option<(&str, Instant)> {
        self.prev.as_ref().map(|(raw, at)| (raw.as_str(), *at))
    }

    pub fn advance(&mut self, raw: String, at: Instant) {
        self.prev = Some((raw, at));
    }
}

/// Milliseconds between two sample times, floored to one so rate
/// divisions stay finite even if the clock reports a zero window.
pub(crate) fn elapsed_ms(older: Instant, newer: Instant) -> i64 {
    (newer.duration_since(older).as_millis() as i64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_empty_and_advances() {
        let mut window = SampleWindow::default();
        assert!(window.get().is_none());

        let t0 = Instant::now();
        window.advance("first".to_string(), t0);
        let (raw, at) = window.get().unwrap();
        assert_eq!(raw, "first");
        assert_eq!(at, t0);

        let t1 = Instant::now();
        window.advance("second".to_string(), t1);
        assert_eq!(window.get().unwrap().0, "second");
    }

    #[test]
    fn elapsed_is_floored_to_one_millisecond() {
        let now = Instant::now();
        assert_eq!(elapsed_ms(now, now), 1);
        let later = now + Duration::from_millis(2500);
        assert_eq!(elapsed_ms(now, later), 2500);
    }
}
