//! The `Simulation` struct and its fixed-tick loop.

use occ_core::{AgentId, AgentState, SimClock, SimConfig, Tick};
use occ_escape::DestinationSource;
use occ_floor::FloorQuery;
use occ_motion::LocomotionEngine;
use tracing::{info, trace};

use crate::{SimError, SimObserver, SimResult, TickSummary, VisitHistogram};

/// Upper bound on engine slices per fixed tick.  A tick that needs more is
/// treated as a stuck contact.
pub const MAX_SUB_STEPS: usize = 10_000;

/// Summary of a finished (or stopped) run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub agent: AgentId,

    /// Fixed ticks simulated.
    pub ticks: u64,

    /// Simulated time covered by those ticks.
    pub walked_time: f64,

    /// Path length walked.
    pub walked_distance: f64,

    /// Slices that ended at a barrier contact.
    pub collisions: u64,

    /// Agent state after the last tick.
    pub final_state: AgentState,

    /// `true` when an observer ended the run before its duration.
    pub stopped_early: bool,
}

/// Drives one agent through fixed ticks.
///
/// Each tick arms the engine with the tick length and keeps calling it
/// until the budget is used up, then records the agent's cell.
///
/// Create via [`SimulationBuilder`][crate::SimulationBuilder].
pub struct Simulation<'f, S: DestinationSource> {
    /// Run configuration (tick length, duration, seed, …).
    pub config: SimConfig,

    /// Simulation clock.
    pub clock: SimClock,

    pub(crate) agent:           AgentId,
    pub(crate) floor:           &'f dyn FloorQuery,
    pub(crate) engine:          LocomotionEngine,
    pub(crate) source:          S,
    pub(crate) visits:          VisitHistogram,
    pub(crate) walked_distance: f64,
    pub(crate) walked_time:     f64,
    pub(crate) collisions:      u64,
}

impl<'f, S: DestinationSource> Simulation<'f, S> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn engine(&self) -> &LocomotionEngine {
        &self.engine
    }

    pub fn state(&self) -> &AgentState {
        self.engine.state()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn visits(&self) -> &VisitHistogram {
        &self.visits
    }

    pub fn into_visits(self) -> VisitHistogram {
        self.visits
    }

    pub fn walked_distance(&self) -> f64 {
        self.walked_distance
    }

    pub fn walked_time(&self) -> f64 {
        self.walked_time
    }

    /// `true` once the configured duration is covered.
    pub fn is_finished(&self) -> bool {
        self.clock.current_tick.0 >= self.config.total_ticks()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the configured duration is covered or `observer` asks to
    /// stop.
    ///
    /// A data-integrity error ends the run; the agent's state stays at the
    /// last completed slice.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunReport> {
        info!(agent = %self.agent, ticks = self.config.total_ticks(), "run started");
        let total = self.config.total_ticks();
        let mut stopped_early = false;

        while !self.is_finished() {
            if observer.should_stop() {
                stopped_early = true;
                break;
            }
            self.observed_tick(observer)?;
            observer.on_progress(self.clock.current_tick.0 as f64 / total as f64 * 100.0);
        }

        let report = self.report(stopped_early);
        info!(
            agent = %self.agent,
            ticks = report.ticks,
            walked_distance = report.walked_distance,
            collisions = report.collisions,
            stopped_early,
            "run finished"
        );
        observer.on_sim_end(&report);
        Ok(report)
    }

    /// Run exactly `n` ticks from the current position (ignores the
    /// configured duration).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_tick(observer)?;
        }
        Ok(())
    }

    /// Snapshot of the run so far.
    pub fn report(&self, stopped_early: bool) -> RunReport {
        RunReport {
            agent:           self.agent,
            ticks:           self.clock.current_tick.0,
            walked_time:     self.walked_time,
            walked_distance: self.walked_distance,
            collisions:      self.collisions,
            final_state:     *self.engine.state(),
            stopped_early,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn observed_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now)?;
        observer.on_tick_end(now, &summary);
        let interval = self.config.trail_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, &summary.state);
        }
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<TickSummary> {
        self.engine.begin_tick(self.config.tick_secs);

        let mut sub_steps  = 0;
        let mut collisions = 0;
        let mut walked     = 0.0;
        while !self.engine.is_tick_complete() {
            if sub_steps >= MAX_SUB_STEPS {
                return Err(SimError::SubStepLimit { tick: now, limit: MAX_SUB_STEPS });
            }
            let before = self.engine.state().location;
            let step = self.engine.time_step_update(self.floor, &mut self.source)?;
            walked           += before.distance_to(self.engine.state().location);
            self.walked_time += step.consumed;
            sub_steps        += 1;
            if step.collided {
                collisions += 1;
            }
        }
        self.walked_distance += walked;
        self.collisions      += collisions as u64;

        let state = *self.engine.state();
        let cell = self
            .floor
            .find_cell(state.location)
            .ok_or(SimError::UnmappedLocation { location: state.location, tick: now })?;
        self.visits.record(cell);

        trace!(%now, %cell, sub_steps, collisions, "tick complete");
        Ok(TickSummary { state, cell, sub_steps, collisions, walked })
    }
}
