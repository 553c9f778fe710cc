//! Scripted agents that walk a fixed list of waypoints.

use occ_core::{AgentRng, UV};

use crate::{DecisionContext, DestinationSource, EscapeError, EscapeResult};

/// Visits `waypoints` in order, optionally starting over after the last.
///
/// The tour only moves on once the current waypoint has been reached; a
/// re-plan requested earlier (decision period elapsed, barrier close by)
/// hands back the same waypoint.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointTour {
    waypoints:      Vec<UV>,
    next:           usize,
    looping:        bool,
    arrival_radius: f64,
}

impl WaypointTour {
    /// A tour over `waypoints`, arriving within `arrival_radius` of each.
    pub fn new(waypoints: Vec<UV>, arrival_radius: f64) -> EscapeResult<Self> {
        if waypoints.is_empty() {
            return Err(EscapeError::EmptyTour);
        }
        Ok(Self { waypoints, next: 0, looping: false, arrival_radius: arrival_radius.max(0.0) })
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// The waypoint currently being walked to, `None` once a non-looping
    /// tour is finished.
    pub fn current(&self) -> Option<UV> {
        self.waypoints.get(self.next).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.waypoints.len()
    }

    fn advance(&mut self) {
        self.next += 1;
        if self.looping && self.next >= self.waypoints.len() {
            self.next = 0;
        }
    }
}

impl DestinationSource for WaypointTour {
    fn next_destination(&mut self, ctx: &DecisionContext<'_>, _rng: &mut AgentRng) -> Option<UV> {
        // At most one full lap, so a looping tour whose waypoints all sit
        // under the agent still terminates.
        for _ in 0..self.waypoints.len() {
            let target = self.current()?;
            if !self.has_arrived(ctx.state.location, target) {
                return Some(target);
            }
            self.advance();
        }
        self.current()
    }

    fn has_arrived(&self, location: UV, destination: UV) -> bool {
        location.distance_to(destination) <= self.arrival_radius
    }
}
