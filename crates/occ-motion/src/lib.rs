//! `occ-motion`: the per-agent locomotion engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`engine`]    | `LocomotionEngine`: one sub-step of motion per call           |
//! | [`repulsion`] | Bezier response curve and barrier repulsion force              |
//! | [`error`]     | `MotionError`, `MotionResult<T>`                               |
//!
//! # Step model (variable sub-steps inside a fixed tick)
//!
//! 1. The driver calls [`LocomotionEngine::begin_tick`] with the fixed tick
//!    length; that becomes the engine's remaining budget.
//! 2. Each [`LocomotionEngine::time_step_update`] integrates over the whole
//!    remaining budget.  If the body stays clear of barriers the budget is
//!    consumed at once.
//! 3. On contact the slice is cut at the moment of contact, the velocity is
//!    bounced and the remaining budget is left for the next call.
//! 4. The driver repeats until [`LocomotionEngine::remaining`] is zero.
//!
//! The fragments reported in [`SubStep::consumed`] always sum to the tick
//! length.

pub mod engine;
pub mod error;
pub mod repulsion;


pub use engine::{COLLISION_PENALTY, LocomotionEngine, SubStep};
pub use error::{MotionError, MotionResult};
pub use repulsion::{barrier_repulsion, bezier_repulsion};
