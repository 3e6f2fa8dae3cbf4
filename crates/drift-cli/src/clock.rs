//! Frame pacing for the headless runner.

use drift_core::FrameSource;
use std::time::{Duration, Instant};

/// Delta-time clock with clamped ticks.
///
/// The clamp keeps a stalled process (debugger, suspended terminal) from
/// reporting one enormous frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Advance and return the clamped time since the previous tick.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        dt
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Time since the last tick, unclamped.
    pub fn since_last(&self) -> Duration {
        self.last.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamped frame deltas seen by a [`PacedFrames`] source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTiming {
    pub waits: u64,
    pub total: Duration,
    pub longest: Duration,
}

impl FrameTiming {
    pub fn record(&mut self, dt: Duration) {
        self.waits += 1;
        self.total += dt;
        self.longest = self.longest.max(dt);
    }

    /// Average delta, `None` before the first wait.
    pub fn mean(&self) -> Option<Duration> {
        let waits = u32::try_from(self.waits).ok().filter(|w| *w > 0)?;
        Some(self.total / waits)
    }
}

/// Frame source that yields a fixed number of frames, optionally at a fixed rate.
///
/// Once the budget is spent it reports the host as closed.
#[derive(Debug)]
pub struct PacedFrames {
    clock: FrameClock,
    interval: Option<Duration>,
    remaining: u64,
    timing: FrameTiming,
}

impl PacedFrames {
    /// `frames` waits in total; `fps` of `None` never sleeps.
    pub fn new(frames: u64, fps: Option<f64>) -> Self {
        let interval = fps
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| Duration::from_secs_f64(1.0 / f));
        Self {
            clock: FrameClock::new(),
            interval,
            remaining: frames,
            timing: FrameTiming::default(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }
}

impl FrameSource for PacedFrames {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        if let Some(interval) = self.interval {
            let elapsed = self.clock.since_last();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        let dt = self.clock.tick();
        self.timing.record(dt);
        log::trace!("frame {} after {dt:?}", self.clock.frame_index());
        self.remaining -= 1;
        true
    }
}
