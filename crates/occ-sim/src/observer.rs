//! Simulation observer trait for progress reporting and data collection.

use occ_core::{AgentState, CellId, Tick};

use crate::RunReport;

/// What happened to the agent during one fixed tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickSummary {
    /// State at the end of the tick.
    pub state: AgentState,

    /// Cell the agent ended the tick in.
    pub cell: CellId,

    /// Engine slices needed to finish the tick.
    pub sub_steps: usize,

    /// Slices that ended at a barrier contact.
    pub collisions: usize,

    /// Distance walked during the tick.
    pub walked: f64,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at tick
/// boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: stop once the agent leaves the west half
///
/// ```rust,ignore
/// struct WestHalf { reached_east: bool }
///
/// impl SimObserver for WestHalf {
///     fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
///         self.reached_east |= summary.state.location.u > 5.0;
///     }
///     fn should_stop(&self) -> bool {
///         self.reached_east
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before the engine runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once the tick's sub-steps are all consumed.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called every `config.trail_interval_ticks` ticks with the agent's
    /// full state.
    fn on_snapshot(&mut self, _tick: Tick, _state: &AgentState) {}

    /// Called after every tick with the share of the run completed, in
    /// percent.
    fn on_progress(&mut self, _percent: f64) {}

    /// Checked between ticks; returning `true` ends the run early.
    fn should_stop(&self) -> bool {
        false
    }

    /// Called once after the final tick.
    fn on_sim_end(&mut self, _report: &RunReport) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Collects `(tick, state)` snapshots: the agent's trajectory.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailRecorder {
    pub points: Vec<(Tick, AgentState)>,
}

impl TrailRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total path length along the recorded points.
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].1.location.distance_to(w[1].1.location))
            .sum()
    }
}

impl SimObserver for TrailRecorder {
    fn on_snapshot(&mut self, tick: Tick, state: &AgentState) {
        self.points.push((tick, *state));
    }
}
