//! The narrow interface the locomotion engine uses to see the floor.

use occ_core::{CellId, UV};

use crate::{Collision, CollisionAnalyzer};

/// Which barrier layer a query runs against.
///
/// Physical barriers stop bodies; visual barriers only block sight lines
/// (glass partitions are physical but not visual, a rope line the reverse).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierKind {
    Physical,
    Visual,
}

/// A straight barrier segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarrierEdge {
    pub start: UV,
    pub end:   UV,
}

impl BarrierEdge {
    #[inline]
    pub fn new(start: UV, end: UV) -> Self {
        Self { start, end }
    }

    /// Closest point of the segment to `point`.
    pub fn closest_point(&self, point: UV) -> UV {
        let along  = self.end - self.start;
        let len_sq = along.length_squared();
        if len_sq == 0.0 {
            return self.start;
        }
        let t = ((point - self.start).dot(along) / len_sq).clamp(0.0, 1.0);
        self.start + along * t
    }

    /// Where the straight move `from → to` meets this segment, as the
    /// fraction of the move travelled and the meeting point.  Moves
    /// parallel to the segment never meet it.
    pub fn intersection(&self, from: UV, to: UV) -> Option<(f64, UV)> {
        let path  = to - from;
        let along = self.end - self.start;
        let denom = path.cross(along);
        if denom.abs() < 1e-12 {
            return None;
        }
        let offset = self.start - from;
        let s = offset.cross(along) / denom;
        let w = offset.cross(path) / denom;
        ((0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&w)).then(|| (s, from + path * s))
    }

    /// Unit normal of the supporting line (left-hand side of `start → end`).
    /// `None` for a degenerate zero-length edge.
    pub fn normal(&self) -> Option<UV> {
        let along = self.end - self.start;
        UV::new(-along.v, along.u).normalized()
    }
}

/// Spatial floor queries consumed by the locomotion engine and the driver.
///
/// Implementations must be immutable after construction; batch runs share a
/// single floor across worker threads.
pub trait FloorQuery {
    /// The walkable cell containing `point`, or `None` outside the field.
    fn find_cell(&self, point: UV) -> Option<CellId>;

    /// The walkable cell `d_col` columns and `d_row` rows away from `cell`.
    fn cell_at_offset(&self, cell: CellId, d_col: i32, d_row: i32) -> Option<CellId>;

    /// Centre point of `cell`.
    fn cell_center(&self, cell: CellId) -> Option<UV>;

    /// Nearest barrier of `kind` as seen from `point`.
    ///
    /// `None` means the floor holds no barrier information for the point
    /// (it lies outside the walkable field).
    fn colliding_edge(&self, point: UV, kind: BarrierKind) -> Option<CollisionAnalyzer>;

    /// The first barrier of `kind` the straight move `from → to` crosses,
    /// analysed at `to` (see [`CollisionAnalyzer::crossing`]).
    ///
    /// Floors without a segment index report no crossings; the engine then
    /// relies on [`colliding_edge`](Self::colliding_edge) alone.
    fn crossing_edge(&self, _from: UV, _to: UV, _kind: BarrierKind) -> Option<CollisionAnalyzer> {
        None
    }

    /// Resolve the swept contact between two successive samples.
    fn collision(
        &self,
        previous:  &CollisionAnalyzer,
        next:      &CollisionAnalyzer,
        radius:    f64,
        tolerance: f64,
    ) -> Option<Collision> {
        Collision::resolve(previous, next, radius, tolerance)
    }
}
