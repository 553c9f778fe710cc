//! `occ-sim`: fixed-tick driver for the occnav engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks():
//!   ① Budget:    engine.begin_tick(tick_secs)
//!   ② Slices:    engine.time_step_update(..) until the budget is zero
//!                 (at most MAX_SUB_STEPS slices)
//!   ③ Occupancy: record the agent's cell in the visit histogram
//!   ④ Observe:   on_tick_end, on_snapshot every trail_interval_ticks,
//!                 on_progress; should_stop is checked before the next tick
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs batch agents on Rayon's thread pool.              |
//! | `fx-hash`  | FxHash for the visit histogram.                        |
//! | `serde`    | Serialize reports, trails and spawn lists.             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use occ_core::{EngineParams, SimConfig, UV};
//! use occ_escape::EscapeRouteSelector;
//! use occ_sim::{NoopObserver, SimulationBuilder};
//!
//! let mut sim = SimulationBuilder::new(config, EngineParams::default(), &floor, EscapeRouteSelector::new(&routes))
//!     .spawn(UV::new(1.5, 1.5), UV::new(1.0, 0.0))
//!     .build()?;
//! let report = sim.run(&mut NoopObserver)?;
//! ```

pub mod batch;
pub mod builder;
pub mod error;
pub mod observer;
pub mod occupancy;
pub mod sim;

#[cfg(test)]
mod tests;

pub use batch::{AgentOutcome, AgentSpawn, BatchReport, BatchRunner};
pub use builder::SimulationBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary, TrailRecorder};
pub use occupancy::VisitHistogram;
pub use sim::{MAX_SUB_STEPS, RunReport, Simulation};
