//! `occ-escape`: where agents decide to walk next.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`routes`]   | `AgentCellDestination`, `CellEscapeRoutes`, `EscapeRoutes`      |
//! | [`selector`] | `select_destination`, `EscapeRouteSelector`, decision periods   |
//! | [`tour`]     | `WaypointTour`: scripted agents visiting fixed waypoints       |
//! | [`source`]   | `DestinationSource` trait, `DecisionContext<'a>`                |
//! | [`error`]    | `EscapeError`, `EscapeResult<T>`                                |
//!
//! # Design notes
//!
//! The locomotion engine asks its [`DestinationSource`] for a new goal
//! whenever a re-plan is due.  Two sources exist:
//!
//! - [`EscapeRouteSelector`] draws from the precomputed escape routes of the
//!   agent's cell, weighted by heading alignment and desirability;
//! - [`WaypointTour`] walks a fixed list of waypoints in order.
//!
//! Both return `Option`: "no destination available" is a normal outcome and
//! the engine keeps walking toward its previous goal.

pub mod error;
pub mod routes;
pub mod selector;
pub mod source;
pub mod tour;


pub use error::{EscapeError, EscapeResult};
pub use routes::{AgentCellDestination, CellEscapeRoutes, EscapeRoutes};
pub use selector::{EscapeRouteSelector, sample_decision_period, select_destination};
pub use source::{ARRIVAL_DISTANCE_SQUARED, DecisionContext, DestinationSource};
pub use tour::WaypointTour;
