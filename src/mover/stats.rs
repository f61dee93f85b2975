//! Periodic throughput reporting.
//!
//! One stat task samples the shared moved-items counter at a fixed
//! interval and logs the delta since the previous sample. Idle intervals
//! produce no log line, so a quiet mover stays quiet.

use std::time::Duration;

use super::MoverHandle;

/// One interval's worth of counter movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSample {
    /// Counter value at this sample.
    pub current: u64,
    /// Counter value at the previous sample.
    pub previous: u64,
    /// Items moved during the interval.
    pub delta: u64,
    /// Items per second over the interval.
    pub rate: u64,
}

/// Samples the moved counter and logs non-zero deltas.
pub struct StatReporter {
    handle: MoverHandle,
    interval: Duration,
    previous: u64,
}

impl StatReporter {
    #[must_use]
    pub fn new(handle: MoverHandle, interval: Duration) -> Self {
        Self {
            handle,
            interval,
            previous: 0,
        }
    }

    /// Reads the counter and returns a sample when it advanced.
    ///
    /// The previous value moves forward either way, so a burst is only
    /// reported once.
    fn sample(&mut self) -> Option<StatSample> {
        let current = self.handle.moved_total();
        let previous = self.previous;
        self.previous = current;

        let delta = current - previous;
        if delta == 0 {
            return None;
        }
        Some(StatSample {
            current,
            previous,
            delta,
            rate: delta / self.interval.as_secs().max(1),
        })
    }

    /// Logs throughput until shutdown.
    pub async fn run(mut self) {
        loop {
            if self.handle.is_shutdown() {
                break;
            }
            self.handle.idle(self.interval).await;
            if let Some(s) = self.sample() {
                tracing::info!(
                    moved = s.current,
                    previous = s.previous,
                    delta = s.delta,
                    rate = s.rate,
                    "throughput"
                );
            }
        }
        tracing::debug!(moved = self.handle.moved_total(), "stat reporter stopped");
    }
}
