//! Drift-free one-second tick source.
//!
//! Tick boundaries are anchored to the moment the clock started:
//! tick `n` is due at `anchor + n * 1s`, never at `last_callback + 1s`.
//! Late or throttled callbacks therefore never shift later ticks; a poll
//! after a long gap simply reports every boundary that was crossed.
//!
//! ```text
//! anchor        1s          2s          3s
//!   |-----------|-----------|-----------|----
//!        poll ^ (0)               poll ^ (2)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

/// A monotonic time source, measured from an arbitrary origin.
pub trait MonotonicClock {
    fn now(&self) -> Duration;
}

/// Wall-clock backed monotonic time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

/// Emits one tick per elapsed second while running.
#[derive(Debug)]
pub struct PhaseClock<C> {
    clock: C,
    /// Clock reading tick boundaries are counted from. `None` while stopped.
    anchor: Option<Duration>,
    /// Ticks reported since `anchor`.
    emitted: u64,
    /// Time already elapsed toward the next tick when the clock was stopped.
    carried: Duration,
}

impl<C: MonotonicClock> PhaseClock<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            anchor: None,
            emitted: 0,
            carried: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start ticking. Returns `false` without side effects if already running.
    pub fn start(&mut self) -> bool {
        if self.anchor.is_some() {
            return false;
        }
        let now = self.clock.now();
        self.anchor = Some(now.saturating_sub(self.carried));
        self.emitted = 0;
        self.carried = Duration::ZERO;
        true
    }

    /// Stop ticking, keeping the partial second already elapsed. Idempotent.
    pub fn stop(&mut self) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };
        let elapsed = self.clock.now().saturating_sub(anchor);
        self.carried = elapsed.saturating_sub(Duration::from_secs(self.emitted));
        self.emitted = 0;
    }

    /// Stop and forget any partial second.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.emitted = 0;
        self.carried = Duration::ZERO;
    }

    /// Number of second boundaries crossed since the previous poll.
    pub fn poll(&mut self) -> u64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let total = self.clock.now().saturating_sub(anchor).as_secs();
        let due = total.saturating_sub(self.emitted);
        self.emitted = self.emitted.max(total);
        due
    }

    /// Time left until the next absolute tick boundary, `None` while stopped.
    pub fn until_next_tick(&self) -> Option<Duration> {
        let anchor = self.anchor?;
        let next = anchor + Duration::from_secs(self.emitted) + TICK;
        Some(next.saturating_sub(self.clock.now()))
    }
}
