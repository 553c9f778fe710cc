//! `occ-core`: foundational types for the `occnav` occupant-navigation engine.
//!
//! This crate is a dependency of every other `occ-*` crate.  It has no
//! `occ-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`geometry`]    | `UV` plane vector, `rotate_toward` heading helper     |
//! | [`ids`]         | `AgentId`, `CellId`                                   |
//! | [`params`]      | `EngineParams`: locomotion constants for one run     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`state`]       | `AgentState`: location, velocity, facing             |
//! | [`rng`]         | `AgentRng` (per-agent, seeded)                        |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geometry;
pub mod ids;
pub mod params;
pub mod rng;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geometry::{UV, rotate_toward};
pub use ids::{AgentId, CellId};
pub use params::EngineParams;
pub use rng::AgentRng;
pub use state::AgentState;
pub use time::{SimClock, SimConfig, Tick};
