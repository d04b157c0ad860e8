use std::time::{Duration, Instant};

use super::{ComputationHandler, DiagEvent};

/// The timing regime of a [`TimeoutHandler`].
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Timer {
    /// A single timeout for the whole computation.
    SingleTimeout(Duration),
    /// A timeout which restarts whenever a new computation starts.
    RestartingTimeout(Duration),
    /// A fixed point in time at which the computation is aborted.
    FixedEnd(Instant),
}

/// A handler which aborts a computation after a caller-imposed time budget.
///
/// The external solver call itself is blocking and cannot be interrupted by
/// this handler; the budget is checked at every event, so expiry takes
/// effect at the next stage boundary.
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct TimeoutHandler {
    timer: Timer,
    checkpoint: Instant,
}

impl TimeoutHandler {
    /// Creates a new timeout handler with the given timer.
    pub fn new(timer: Timer) -> Self {
        Self { timer, checkpoint: Instant::now() }
    }
}

impl ComputationHandler for TimeoutHandler {
    fn should_resume(&mut self, event: DiagEvent) -> bool {
        match self.timer {
            Timer::SingleTimeout(timeout) => self.checkpoint.elapsed() < timeout,
            Timer::RestartingTimeout(timeout) => {
                if matches!(event, DiagEvent::ComputationStarted(_)) {
                    self.checkpoint = Instant::now();
                }
                self.checkpoint.elapsed() < timeout
            }
            Timer::FixedEnd(end) => Instant::now() < end,
        }
    }
}
