//! The `DestinationSource` trait: how an engine obtains its next goal.

use occ_core::{AgentRng, AgentState, EngineParams, UV};
use occ_floor::FloorQuery;

/// Squared distance under which a destination counts as reached.
pub const ARRIVAL_DISTANCE_SQUARED: f64 = 0.01;

/// Read-only view passed to a [`DestinationSource`] when a re-plan is due.
pub struct DecisionContext<'a> {
    /// The agent's state at the start of the step.
    pub state: &'a AgentState,

    /// Current goal, if any.
    pub destination: Option<UV>,

    /// Floor used to locate the agent's cell.
    pub floor: &'a dyn FloorQuery,

    /// Run parameters (visibility cone, selection weights, …).
    pub params: &'a EngineParams,
}

impl<'a> DecisionContext<'a> {
    #[inline]
    pub fn new(
        state:       &'a AgentState,
        destination: Option<UV>,
        floor:       &'a dyn FloorQuery,
        params:      &'a EngineParams,
    ) -> Self {
        Self { state, destination, floor, params }
    }
}

/// Pluggable destination choice.
///
/// Only [`next_destination`](Self::next_destination) is required.  Return
/// `None` when nothing can be chosen; the engine then keeps its current
/// destination (or stays put if it never had one).
pub trait DestinationSource {
    /// Pick the agent's next goal.
    fn next_destination(&mut self, ctx: &DecisionContext<'_>, rng: &mut AgentRng) -> Option<UV>;

    /// Whether an agent at `location` has reached `destination`.
    ///
    /// Default: within [`ARRIVAL_DISTANCE_SQUARED`].
    fn has_arrived(&self, location: UV, destination: UV) -> bool {
        location.distance_squared_to(destination) < ARRIVAL_DISTANCE_SQUARED
    }
}

impl<S: DestinationSource + ?Sized> DestinationSource for &mut S {
    fn next_destination(&mut self, ctx: &DecisionContext<'_>, rng: &mut AgentRng) -> Option<UV> {
        (**self).next_destination(ctx, rng)
    }

    fn has_arrived(&self, location: UV, destination: UV) -> bool {
        (**self).has_arrived(location, destination)
    }
}
