//! Per-agent kinematic state.

use crate::UV;

/// Where an agent is, how fast it moves, and which way it faces.
///
/// `direction` is a unit vector.  It is only ever changed by bounded
/// rotation (see [`rotate_toward`](crate::rotate_toward)), which preserves
/// unit length.  The engine keeps two independent copies per step: the
/// state before integration and the candidate state after it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub location:  UV,
    pub velocity:  UV,
    pub direction: UV,
}

impl AgentState {
    /// A standing agent at `location`, facing `direction`.
    ///
    /// A zero `direction` falls back to facing `+u`.
    pub fn at_rest(location: UV, direction: UV) -> Self {
        Self {
            location,
            velocity:  UV::ZERO,
            direction: direction.normalized().unwrap_or(UV::new(1.0, 0.0)),
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}
