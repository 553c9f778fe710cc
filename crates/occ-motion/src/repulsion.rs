//! Barrier repulsion.

use occ_core::{EngineParams, UV};
use occ_floor::CollisionAnalyzer;

/// Middle control point of the quadratic Bezier curve.  Below 0.5 the curve
/// stays flat near the range limit and rises steeply close to the wall.
const BEZIER_CONTROL: f64 = 0.25;

/// Repulsion magnitude at `distance` from a barrier.
///
/// Equals `change_rate` at distance 0, decreases monotonically, and is 0
/// at and beyond `range`.
pub fn bezier_repulsion(distance: f64, range: f64, change_rate: f64) -> f64 {
    if !(range > 0.0) || !(distance < range) {
        return 0.0;
    }
    let u = 1.0 - distance.max(0.0) / range;
    change_rate * (2.0 * u * (1.0 - u) * BEZIER_CONTROL + u * u)
}

/// Repulsion force exerted by the barrier described by `analyzer` on an
/// agent heading along `direction`.
///
/// Barriers the agent is not heading toward (normal and heading at or
/// below 90° apart) exert nothing.
pub fn barrier_repulsion(analyzer: &CollisionAnalyzer, direction: UV, params: &EngineParams) -> UV {
    let normal = analyzer.normalized_repulsion;
    if normal.dot(direction) >= 0.0 {
        return UV::ZERO;
    }
    let magnitude = bezier_repulsion(
        analyzer.distance_to_barrier,
        params.barrier_repulsion_range,
        params.repulsion_change_rate,
    );
    normal * magnitude
}
