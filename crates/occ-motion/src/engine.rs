//! The locomotion engine: goal seeking, barrier repulsion, contact response.

use occ_core::{AgentRng, AgentState, EngineParams, UV, rotate_toward};
use occ_escape::{DecisionContext, DestinationSource, sample_decision_period};
use occ_floor::{BarrierKind, Collision, CollisionAnalyzer, FloorQuery};
use tracing::{debug, trace};

use crate::{MotionError, MotionResult, barrier_repulsion};

/// Distance a resolved body is pushed back along the contact normal so the
/// next slice does not start inside the contact zone.
pub const COLLISION_PENALTY: f64 = 1e-3;

/// Outcome of one [`LocomotionEngine::time_step_update`] call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubStep {
    /// Simulated time spent by this slice.
    pub consumed: f64,

    /// `true` when the slice ended at a barrier contact.
    pub collided: bool,
}

/// Moves one agent across the floor in variable sub-steps.
///
/// Owns everything that changes between steps: the kinematic state, the
/// analyzer carried over from the previous slice, the current destination
/// and the decision timer.  The destination source and the floor are lent
/// to each call, so the same engine type drives both escape-route agents
/// and scripted tours.
pub struct LocomotionEngine {
    params:          EngineParams,
    state:           AgentState,
    analyzer:        Option<CollisionAnalyzer>,
    destination:     Option<UV>,
    walk_time:       f64,
    decision_period: f64,
    remaining:       f64,
    rng:             AgentRng,
}

impl LocomotionEngine {
    /// An engine for an agent starting in `state`.
    ///
    /// `params` are validated once here and stay fixed for the engine's
    /// lifetime.
    ///
    /// The heading of `state` is unitized; a zero or non-finite heading is
    /// rejected.
    pub fn new(params: EngineParams, mut state: AgentState, mut rng: AgentRng) -> MotionResult<Self> {
        params.validate()?;
        state.direction = state
            .direction
            .normalized()
            .filter(|d| d.is_finite())
            .ok_or(MotionError::DegenerateHeading { location: state.location })?;
        let decision_period = sample_decision_period(params.decision_rate, &mut rng);
        Ok(Self {
            params,
            state,
            analyzer: None,
            destination: None,
            walk_time: 0.0,
            decision_period,
            remaining: 0.0,
            rng,
        })
    }

    /// Start with a known destination instead of asking the source first.
    pub fn with_destination(mut self, destination: UV) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn destination(&self) -> Option<UV> {
        self.destination
    }

    /// Analyzer carried forward from the last slice (`None` before the
    /// first step).
    pub fn analyzer(&self) -> Option<&CollisionAnalyzer> {
        self.analyzer.as_ref()
    }

    /// Time walked since the last destination decision.
    pub fn walk_time(&self) -> f64 {
        self.walk_time
    }

    /// Time left in the current fixed tick.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_tick_complete(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Arm the engine for a fixed tick of `tick_secs`.
    pub fn begin_tick(&mut self, tick_secs: f64) {
        self.remaining = tick_secs.max(0.0);
    }

    /// Run one slice of the current tick.
    ///
    /// Returns the time the slice consumed.  Errors leave the agent's
    /// kinematic state untouched; the run for this agent cannot continue.
    pub fn time_step_update<S>(&mut self, floor: &dyn FloorQuery, source: &mut S) -> MotionResult<SubStep>
    where
        S: DestinationSource + ?Sized,
    {
        let dt = self.remaining;
        if dt <= 0.0 {
            return Ok(SubStep { consumed: 0.0, collided: false });
        }

        let previous_analyzer = match self.analyzer {
            Some(analyzer) => analyzer,
            None => self.analyze(floor, self.state.location)?,
        };
        self.refresh_destination(floor, source, &previous_analyzer);

        let previous = self.state;
        let goal = self
            .destination
            .and_then(|d| (d - previous.location).normalized())
            .unwrap_or(UV::ZERO);
        let repulsion    = barrier_repulsion(&previous_analyzer, previous.direction, &self.params);
        let acceleration = goal * self.params.acceleration + repulsion;

        let next = self.integrate(&previous, acceleration, goal, dt);
        // A move that carries the centre across a barrier is a contact with
        // that barrier, wherever the sample landed.
        let crossing = floor.crossing_edge(previous.location, next.location, BarrierKind::Physical);
        let crossed = crossing.is_some();
        let next_analyzer = match crossing {
            Some(analyzer) => analyzer,
            None => self.analyze(floor, next.location)?,
        };

        if !crossed && !next_analyzer.is_in_contact(self.params.contact_radius()) {
            trace!(u = next.location.u, v = next.location.v, speed = next.speed(), "free step");
            self.state     = next;
            self.analyzer  = Some(next_analyzer);
            self.walk_time += dt;
            self.remaining = 0.0;
            return Ok(SubStep { consumed: dt, collided: false });
        }

        let collision = floor
            .collision(
                &previous_analyzer,
                &next_analyzer,
                self.params.contact_radius(),
                self.params.collision_tolerance,
            )
            .ok_or(MotionError::UnresolvedContact { location: next.location })?;

        let (consumed, remaining) = collision.split(dt);
        self.state = self.bounce(&previous, &collision, acceleration, goal, consumed);
        self.analyzer = Some(next_analyzer.settled_at(
            self.state.location,
            self.params.contact_radius(),
            collision.normal(),
        ));
        self.walk_time += consumed;
        self.remaining = remaining;

        debug!(
            u = self.state.location.u,
            v = self.state.location.v,
            consumed,
            remaining,
            crossed,
            "barrier contact resolved"
        );
        Ok(SubStep { consumed, collided: true })
    }

    fn analyze(&self, floor: &dyn FloorQuery, location: UV) -> MotionResult<CollisionAnalyzer> {
        floor
            .colliding_edge(location, BarrierKind::Physical)
            .ok_or(MotionError::NoBarrierInfo { location })
    }

    fn refresh_destination<S>(
        &mut self,
        floor:    &dyn FloorQuery,
        source:   &mut S,
        analyzer: &CollisionAnalyzer,
    ) where
        S: DestinationSource + ?Sized,
    {
        let location = self.state.location;
        let due = self.walk_time > self.decision_period
            || match self.destination {
                None => true,
                Some(d) => source.has_arrived(location, d),
            }
            || analyzer.distance_to_barrier < self.params.body_size;
        if !due {
            return;
        }

        let ctx = DecisionContext::new(&self.state, self.destination, floor, &self.params);
        match source.next_destination(&ctx, &mut self.rng) {
            Some(destination) => {
                self.destination     = Some(destination);
                self.walk_time       = 0.0;
                self.decision_period = sample_decision_period(self.params.decision_rate, &mut self.rng);
                trace!(u = destination.u, v = destination.v, "destination chosen");
            }
            None => trace!("no destination available; keeping the current one"),
        }
    }

    /// Free-flight integration of `previous` over `dt`.
    fn integrate(&self, previous: &AgentState, acceleration: UV, goal: UV, dt: f64) -> AgentState {
        let velocity = (previous.velocity + acceleration * dt).clamp_length(self.params.velocity_cap);
        AgentState {
            location:  previous.location + velocity * dt,
            velocity,
            direction: rotate_toward(previous.direction, goal, self.params.angular_velocity * dt),
        }
    }

    /// State right after a contact reached `consumed` seconds into the slice.
    fn bounce(
        &self,
        previous:     &AgentState,
        collision:    &Collision,
        acceleration: UV,
        goal:         UV,
        consumed:     f64,
    ) -> AgentState {
        let params = &self.params;
        let normal = collision.normal();

        let at_contact = (previous.velocity + acceleration * consumed).clamp_length(params.velocity_cap);
        let vertical   = at_contact.project_onto(normal);
        let horizontal = at_contact - vertical;

        // Moving away from the barrier already: nothing to absorb.
        let velocity = if at_contact.dot(normal) < 0.0 {
            let friction = (params.barrier_friction * vertical.length()).min(horizontal.length());
            let friction_term = horizontal.normalized().map_or(UV::ZERO, |h| h * friction);
            let vertical_acceleration = acceleration.project_onto(normal);
            (horizontal - friction_term - vertical * params.body_elasticity - vertical_acceleration * consumed)
                .clamp_length(params.velocity_cap)
        } else {
            at_contact
        };

        let anchor = if consumed > 0.0 { collision.collision_point } else { previous.location };
        AgentState {
            location:  anchor + normal * COLLISION_PENALTY,
            velocity,
            direction: rotate_toward(previous.direction, goal, params.angular_velocity * consumed),
        }
    }
}
