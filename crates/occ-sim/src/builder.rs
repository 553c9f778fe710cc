//! Fluent builder for constructing a [`Simulation`].

use occ_core::{AgentId, AgentRng, AgentState, EngineParams, SimConfig, Tick, UV};
use occ_escape::DestinationSource;
use occ_floor::FloorQuery;
use occ_motion::LocomotionEngine;

use crate::{SimError, SimResult, Simulation, VisitHistogram};

/// Fluent builder for [`Simulation<S>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick length, duration, seed, …
/// - [`EngineParams`]: locomotion constants
/// - `&dyn FloorQuery`: the floor to walk on
/// - `S: DestinationSource`: where the agent decides to go
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                           |
/// |-------------------|-----------------------------------|
/// | `.agent(id)`      | `AgentId(0)`                      |
/// | `.spawn(p, dir)`  | `(0, 0)` facing `+u`              |
/// | `.state(s)`       | at rest at the spawn point        |
/// | `.destination(d)` | asked from the source on step one |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimulationBuilder::new(config, params, &floor, EscapeRouteSelector::new(&routes))
///     .agent(AgentId(7))
///     .spawn(UV::new(1.5, 2.5), UV::new(1.0, 0.0))
///     .build()?;
/// let report = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimulationBuilder<'f, S: DestinationSource> {
    config:      SimConfig,
    params:      EngineParams,
    floor:       &'f dyn FloorQuery,
    source:      S,
    agent:       AgentId,
    state:       AgentState,
    destination: Option<UV>,
}

impl<'f, S: DestinationSource> SimulationBuilder<'f, S> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, params: EngineParams, floor: &'f dyn FloorQuery, source: S) -> Self {
        Self {
            config,
            params,
            floor,
            source,
            agent:       AgentId(0),
            state:       AgentState::at_rest(UV::ZERO, UV::new(1.0, 0.0)),
            destination: None,
        }
    }

    /// Identity used to derive the agent's RNG stream from the run seed.
    pub fn agent(mut self, agent: AgentId) -> Self {
        self.agent = agent;
        self
    }

    /// Place a standing agent at `location`, facing `direction`.
    pub fn spawn(mut self, location: UV, direction: UV) -> Self {
        self.state = AgentState::at_rest(location, direction);
        self
    }

    /// Start from an arbitrary (possibly moving) state.
    pub fn state(mut self, state: AgentState) -> Self {
        self.state = state;
        self
    }

    /// Initial destination, skipping the first source query.
    pub fn destination(mut self, destination: UV) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Validate inputs and return a ready-to-run [`Simulation`].
    pub fn build(self) -> SimResult<Simulation<'f, S>> {
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;
        let mut state = self.state;
        match state.direction.normalized() {
            Some(direction) if state.location.is_finite() => state.direction = direction,
            _ => return Err(SimError::Config("spawn state needs a finite location and a heading".into())),
        }
        if self.floor.find_cell(state.location).is_none() {
            return Err(SimError::UnmappedLocation { location: state.location, tick: Tick::ZERO });
        }

        let rng = AgentRng::new(self.config.seed, self.agent);
        let mut engine = LocomotionEngine::new(self.params, state, rng)?;
        if let Some(destination) = self.destination {
            engine = engine.with_destination(destination);
        }

        Ok(Simulation {
            clock:           self.config.make_clock(),
            config:          self.config,
            agent:           self.agent,
            floor:           self.floor,
            engine,
            source:          self.source,
            visits:          VisitHistogram::new(),
            walked_distance: 0.0,
            walked_time:     0.0,
            collisions:      0,
        })
    }
}
