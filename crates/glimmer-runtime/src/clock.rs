//! Frame clock and monotonic rate gating

use std::time::{Duration, Instant};

/// Longest frame we integrate in one step; larger gaps (breakpoints, a
/// backgrounded window) are clamped.
const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks accumulated frame time.
///
/// `total_time` is the sum of clamped deltas, not wall-clock time, so all
/// time-based animation is reproducible from the sequence of `dt` values.
pub struct FrameClock {
    /// Total elapsed animation time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Frames advanced so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame_count += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by an explicit step (headless and virtual-time runs).
    pub fn advance(&mut self, dt: f64) {
        self.delta_time = dt.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }

    /// Elapsed animation time as a `Duration`
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.total_time)
    }
}

/// Monotonic time source measured from its own creation.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Lets work through at most once per `interval`.
///
/// Used to hold hand-landmark inference to ~24 Hz regardless of how often the
/// surrounding loop spins.
#[derive(Clone, Debug)]
pub struct RateGate {
    interval: Duration,
    last: Option<Duration>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true, and restarts the interval, if enough time has passed
    /// since the last time this returned true.
    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.total_time - 1.0).abs() < 1e-9);
        assert_eq!(clock.frame_count, 60);
    }

    #[test]
    fn test_advance_clamps_large_steps() {
        let mut clock = FrameClock::new();
        clock.advance(3.0);
        assert!((clock.delta_time - MAX_FRAME_TIME).abs() < 1e-12);
        clock.advance(-1.0);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn test_rate_gate_throttles() {
        let mut gate = RateGate::from_millis(42);
        assert!(gate.ready(Duration::from_millis(0)));
        assert!(!gate.ready(Duration::from_millis(20)));
        assert!(!gate.ready(Duration::from_millis(41)));
        assert!(gate.ready(Duration::from_millis(42)));
        assert!(!gate.ready(Duration::from_millis(60)));
        assert!(gate.ready(Duration::from_millis(100)));
    }
}
