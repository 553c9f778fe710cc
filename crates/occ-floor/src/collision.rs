//! Per-point barrier contact data and the swept collision solver.
//!
//! # Contact model
//!
//! The body is a disc of radius `r` around the agent's location.  Between
//! two samples the centre moves on a straight line; contact happens where
//! the centre is exactly `r` away from the contact line.  That line passes
//! through the nearest barrier point of the *later* sample, and its normal
//! points toward the side the *earlier* sample stood on.  For a
//! point on a segment interior that line is the wall itself; near a corner
//! it is the tangent of the corner's clearance circle.

use occ_core::UV;

use crate::BarrierEdge;

// ── CollisionAnalyzer ─────────────────────────────────────────────────────────

/// Nearest-barrier information for one point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionAnalyzer {
    /// The point the analysis was made for.
    pub location: UV,

    /// Distance from `location` to the nearest barrier (always `>= 0`;
    /// `f64::INFINITY` when the floor has no barrier of the queried kind).
    pub distance_to_barrier: f64,

    /// Unit vector pointing away from the nearest barrier (zero when there
    /// is none).
    pub normalized_repulsion: UV,

    /// Nearest point on the barrier.
    pub closest_point: UV,

    /// The barrier edge the nearest point belongs to.
    pub barrier: Option<BarrierEdge>,
}

impl CollisionAnalyzer {
    /// Analyse `location` against a known nearest `barrier`.
    pub fn against(location: UV, barrier: BarrierEdge) -> Self {
        let closest  = barrier.closest_point(location);
        let offset   = location - closest;
        let distance = offset.length();
        let normal = offset
            .normalized()
            .or_else(|| barrier.normal())
            .unwrap_or(UV::ZERO);
        Self {
            location,
            distance_to_barrier:  distance,
            normalized_repulsion: normal,
            closest_point:        closest,
            barrier:              Some(barrier),
        }
    }

    /// Analysis of `location` after a move that crossed `barrier` at
    /// `crossing_point`.
    ///
    /// `closest_point` is the crossing point, so the contact line is the
    /// barrier itself, and the normal points to the side `location` ended
    /// up on.  Always in contact.
    pub fn crossing(location: UV, barrier: BarrierEdge, crossing_point: UV) -> Self {
        let mut normal = barrier.normal().unwrap_or(UV::ZERO);
        if (location - crossing_point).dot(normal) < 0.0 {
            normal = -normal;
        }
        Self {
            location,
            distance_to_barrier:  0.0,
            normalized_repulsion: normal,
            closest_point:        crossing_point,
            barrier:              Some(barrier),
        }
    }

    /// Analysis for a point with no barrier in sight.
    pub fn unobstructed(location: UV) -> Self {
        Self {
            location,
            distance_to_barrier:  f64::INFINITY,
            normalized_repulsion: UV::ZERO,
            closest_point:        location,
            barrier:              None,
        }
    }

    /// `true` when a body of the given radius touches or overlaps the
    /// barrier at this point.
    #[inline]
    pub fn is_in_contact(&self, radius: f64) -> bool {
        self.distance_to_barrier <= radius
    }

    /// Copy carried forward after a resolved contact: the body now rests at
    /// `location`, exactly `radius` from the barrier, on the side `normal`
    /// points to.
    pub fn settled_at(&self, location: UV, radius: f64, normal: UV) -> Self {
        Self {
            location,
            distance_to_barrier:  radius,
            normalized_repulsion: normal,
            ..*self
        }
    }
}

// ── Collision ─────────────────────────────────────────────────────────────────

/// A resolved contact between two successive analyzer samples.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    /// Body centre at the moment of contact.
    pub collision_point: UV,

    /// Fraction of the attempted sub-step that lies *after* the contact.
    /// Raw solver output; see [`split`](Self::split) for how out-of-range
    /// values are treated.
    pub time_step_remainder_proportion: f64,

    normal: UV,
}

impl Collision {
    pub fn new(collision_point: UV, time_step_remainder_proportion: f64, normal: UV) -> Self {
        Self { collision_point, time_step_remainder_proportion, normal }
    }

    /// Unit contact normal pointing back into the walkable side.
    #[inline]
    pub fn normal(&self) -> UV {
        self.normal
    }

    /// Split `sub_step` into `(consumed, remaining)`: the time spent
    /// reaching the contact and the time left to continue after it.
    ///
    /// - proportion `<= 0`: the whole sub-step is consumed;
    /// - proportion `> 1`: nothing is consumed;
    /// - otherwise `consumed = sub_step * (1 - proportion)`.
    pub fn split(&self, sub_step: f64) -> (f64, f64) {
        let p = self.time_step_remainder_proportion;
        let consumed = if p <= 0.0 {
            sub_step
        } else if p > 1.0 || p.is_nan() {
            0.0
        } else {
            sub_step * (1.0 - p)
        };
        (consumed, sub_step - consumed)
    }

    /// Solve the contact between `previous` (before integration) and `next`
    /// (after integration) for a body of `radius`.
    ///
    /// A sample already within `radius + tolerance` of the contact line
    /// makes the contact start at `previous`.  Returns `None` when `next`
    /// has no barrier, or when the motion never approaches the contact line
    /// although it started clear of it.
    pub fn resolve(
        previous:  &CollisionAnalyzer,
        next:      &CollisionAnalyzer,
        radius:    f64,
        tolerance: f64,
    ) -> Option<Collision> {
        if next.barrier.is_none() {
            return None;
        }

        let anchor = next.closest_point;
        let mut normal = next.normalized_repulsion;
        if normal.is_zero() {
            return None;
        }
        if (previous.location - anchor).dot(normal) < 0.0 {
            normal = -normal;
        }

        let d0 = (previous.location - anchor).dot(normal);
        let d1 = (next.location - anchor).dot(normal);

        let t = if d0 <= radius + tolerance {
            0.0
        } else {
            let approach = d0 - d1;
            if approach <= 0.0 || !approach.is_finite() {
                return None;
            }
            (d0 - radius) / approach
        };

        let path  = next.location - previous.location;
        let point = previous.location + path * t.clamp(0.0, 1.0);
        Some(Collision::new(point, 1.0 - t, normal))
    }
}
