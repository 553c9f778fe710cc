//! Simulation time model.
//!
//! # Design
//!
//! The outer driver advances in fixed ticks, counted by a `Tick`.  Simulated
//! time is `tick * tick_secs`; inside a tick the locomotion engine subdivides
//! the interval further when it meets a barrier, but those sub-steps never
//! leak out of the tick.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Index of a fixed tick, counted from the start of the run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }

    /// Simulated time at the start of this tick.
    #[inline]
    pub fn as_secs(self, tick_secs: f64) -> f64 {
        self.0 as f64 * tick_secs
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The driver's position in the run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Length of one fixed tick in seconds.
    pub tick_secs: f64,

    /// The tick about to be simulated.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_secs: f64) -> Self {
        Self { tick_secs, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    /// Simulated seconds covered by the completed ticks.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.as_secs(self.tick_secs)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration for the simulation driver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Fixed tick length in seconds.
    pub tick_secs: f64,

    /// Simulated time to cover.  The run lasts [`total_ticks`](Self::total_ticks)
    /// whole ticks.
    pub duration_secs: f64,

    /// Run seed; every agent's stream is derived from it.
    pub seed: u64,

    /// Worker thread count for batch runs.  `None` uses Rayon's default pool.
    pub num_threads: Option<usize>,

    /// Record the full agent state every N ticks.  0 disables trail output.
    pub trail_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_secs:            0.1,
            duration_secs:        60.0,
            seed:                 0,
            num_threads:          None,
            trail_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// Number of fixed ticks needed to cover `duration_secs`, rounding up.
    /// A ratio within `1e-9` of a whole number counts as that number, so
    /// `30 s / 0.1 s` is 300 ticks and not 301.
    pub fn total_ticks(&self) -> u64 {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0 && self.duration_secs.is_finite()) {
            return 0;
        }
        let ratio = self.duration_secs / self.tick_secs;
        let whole = ratio.round();
        let ticks = if (ratio - whole).abs() < 1e-9 { whole } else { ratio.ceil() };
        ticks.max(0.0) as u64
    }

    /// A clock at tick 0 for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_secs)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(CoreError::OutOfRange {
                name:        "tick_secs",
                requirement: "finite and > 0",
                value:       self.tick_secs,
            });
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(CoreError::OutOfRange {
                name:        "duration_secs",
                requirement: "finite and >= 0",
                value:       self.duration_secs,
            });
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
