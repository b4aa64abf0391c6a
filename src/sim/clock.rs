//! Stopwatch over a millisecond tick source
//!
//! The world reads one `Clock` for every per-entity dt. Tests drive it through
//! `ManualTicks` so elapsed time is exact.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic millisecond counter
pub trait TimeSource: Send + Sync {
    fn ticks_ms(&self) -> u64;
}

/// Wall clock, counted from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemTicks {
    origin: Instant,
}

impl SystemTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTicks {
    fn ticks_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-cranked ticks. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks(Arc<AtomicU64>);

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::Relaxed);
    }
}

impl TimeSource for ManualTicks {
    fn ticks_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Start/stop stopwatch. Starts running on construction.
#[derive(Clone)]
pub struct Clock {
    source: Arc<dyn TimeSource>,
    /// Source reading when the current run began
    start_ms: u64,
    /// Time banked by earlier runs
    stop_ms: u64,
    running: bool,
}

impl Clock {
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        let start_ms = source.ticks_ms();
        Self {
            source,
            start_ms,
            stop_ms: 0,
            running: true,
        }
    }

    /// Clock over the system timer
    pub fn system() -> Self {
        Self::new(Arc::new(SystemTicks::new()))
    }

    /// Clock driven by `ticks`, for tests and replays
    pub fn manual(ticks: &ManualTicks) -> Self {
        Self::new(Arc::new(ticks.clone()))
    }

    /// Copy another clock's reading and run state
    pub fn set(&mut self, other: &Clock) {
        self.source = Arc::clone(&other.source);
        self.start_ms = other.start_ms;
        self.stop_ms = other.stop_ms;
        self.running = other.running;
    }

    /// Back to zero; the run state is kept
    pub fn reset(&mut self) {
        self.start_ms = self.source.ticks_ms();
        self.stop_ms = 0;
    }

    pub fn start(&mut self) {
        if !self.running {
            self.start_ms = self.source.ticks_ms();
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.stop_ms = self.milliseconds();
            self.running = false;
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn milliseconds(&self) -> u64 {
        if self.running {
            self.stop_ms + self.source.ticks_ms().saturating_sub(self.start_ms)
        } else {
            self.stop_ms
        }
    }

    /// Whole seconds
    pub fn seconds(&self) -> u64 {
        self.milliseconds() / 1000
    }

    /// Whole minutes
    pub fn minutes(&self) -> u64 {
        self.seconds() / 60
    }

    /// Whole hours
    pub fn hours(&self) -> u64 {
        self.seconds() / 3600
    }

    /// `h:m:s` reading
    pub fn read(&self) -> String {
        format!(
            "{}:{}:{}",
            self.hours(),
            self.minutes() - self.hours() * 60,
            self.seconds() - self.minutes() * 60
        )
    }

    /// Fractional seconds, the simulation's time base. Kept in f64 so whole
    /// milliseconds stay exact over long runs.
    pub fn now(&self) -> f64 {
        self.milliseconds() as f64 * 0.001
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("milliseconds", &self.milliseconds())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_follows_ticks_while_running() {
        let ticks = ManualTicks::new();
        let clock = Clock::manual(&ticks);
        assert_eq!(clock.milliseconds(), 0);
        ticks.advance(1500);
        assert_eq!(clock.milliseconds(), 1500);
        assert_eq!(clock.seconds(), 1);
        assert!((clock.now() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_millisecond_steps_survive_long_runs() {
        let ticks = ManualTicks::new();
        let clock = Clock::manual(&ticks);
        ticks.set(10 * 3600 * 1000);
        let before = clock.now();
        ticks.advance(1);
        let dt = (clock.now() - before) as f32;
        assert!((dt - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_stopped_clock_holds_and_resumes() {
        let ticks = ManualTicks::new();
        let mut clock = Clock::manual(&ticks);
        ticks.advance(200);
        clock.stop();
        ticks.advance(5000);
        assert_eq!(clock.milliseconds(), 200);
        assert!(!clock.running());

        clock.toggle();
        assert!(clock.running());
        ticks.advance(300);
        assert_eq!(clock.milliseconds(), 500);
    }

    #[test]
    fn test_reset_zeroes_reading() {
        let ticks = ManualTicks::new();
        let mut clock = Clock::manual(&ticks);
        ticks.advance(900);
        clock.reset();
        assert_eq!(clock.milliseconds(), 0);
        ticks.advance(10);
        assert_eq!(clock.milliseconds(), 10);
    }

    #[test]
    fn test_set_copies_other_clock() {
        let ticks = ManualTicks::new();
        let mut a = Clock::manual(&ticks);
        ticks.advance(700);
        let mut b = Clock::manual(&ticks);
        b.stop();
        a.set(&b);
        assert_eq!(a.milliseconds(), 0);
        assert!(!a.running());
    }

    #[test]
    fn test_read_formats_hms() {
        let ticks = ManualTicks::new();
        let clock = Clock::manual(&ticks);
        ticks.advance((3600 + 2 * 60 + 5) * 1000);
        assert_eq!(clock.hours(), 1);
        assert_eq!(clock.minutes(), 62);
        assert_eq!(clock.read(), "1:2:5");
    }
}
