use std::time::Duration;

/// Adaptive backoff for the idle path's non-blocking probe loop.
///
/// Async analogue of the teacher's spin/yield `Backoff`: instead of spinning
/// a CPU core, each step sleeps for a progressively longer duration, capped,
/// so an idle rank yields the executor to its peers rather than busy-polling.
#[derive(Debug)]
pub struct Backoff {
    step: u32,
}

impl Backoff {
    const STEP_LIMIT: u32 = 10;
    const BASE: Duration = Duration::from_micros(50);
    const CAP: Duration = Duration::from_millis(20);

    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Sleeps for this step's duration, then advances to the next step.
    pub async fn snooze(&mut self) {
        let shift = self.step.min(Self::STEP_LIMIT);
        let wait = Self::BASE.saturating_mul(1 << shift).min(Self::CAP);
        tokio::time::sleep(wait).await;
        if self.step < Self::STEP_LIMIT {
            self.step += 1;
        }
    }

    /// Resets the step counter, e.g. after work arrives.
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
