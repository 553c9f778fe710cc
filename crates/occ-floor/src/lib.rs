//! `occ-floor`: cellular floor, barrier index, and collision resolution.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`query`]     | `FloorQuery` trait, `BarrierKind`, `BarrierEdge`               |
//! | [`floor`]     | `CellularFloor` (grid + R-tree per barrier kind), builder      |
//! | [`collision`] | `CollisionAnalyzer`, `Collision`, swept-contact solver         |
//! | [`error`]     | `FloorError`, `FloorResult<T>`                                 |
//!
//! The locomotion engine only talks to [`FloorQuery`]; `CellularFloor` is
//! the in-memory implementation used by the driver, the demos, and tests.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on plain data types.       |

pub mod collision;
pub mod error;
pub mod floor;
pub mod query;


pub use collision::{Collision, CollisionAnalyzer};
pub use error::{FloorError, FloorResult};
pub use floor::{CellularFloor, CellularFloorBuilder};
pub use query::{BarrierEdge, BarrierKind, FloorQuery};
