//! Cellular floor representation and builder.
//!
//! # Data layout
//!
//! The walkable field is a regular grid of square cells anchored at
//! `origin` (the lower-left corner of cell `(0, 0)`).  Cells are numbered
//! row-major:
//!
//! ```text
//! CellId = row * columns + column
//! ```
//!
//! A `walkable` mask marks cells that belong to the field; blocked cells
//! (furniture footprints, wall thickness) are outside it.
//!
//! # Spatial index
//!
//! Barrier segments are bulk-loaded into one R-tree (via `rstar`) per
//! [`BarrierKind`], so a nearest-barrier query is a single
//! `nearest_neighbor` lookup regardless of how many edges the plan has, and
//! a swept-move query only tests the edges whose boxes overlap the move.

use rstar::{AABB, RTree};
use rstar::primitives::Line;

use occ_core::{CellId, UV};

use crate::{BarrierEdge, BarrierKind, CollisionAnalyzer, FloorError, FloorQuery, FloorResult};

type EdgeTree = RTree<Line<[f64; 2]>>;

// ── CellularFloor ─────────────────────────────────────────────────────────────

/// Grid of walkable cells plus barrier indexes.  Immutable once built;
/// construct with [`CellularFloorBuilder`].
pub struct CellularFloor {
    origin:    UV,
    cell_size: f64,
    columns:   u32,
    rows:      u32,
    walkable:  Vec<bool>,
    physical:  EdgeTree,
    visual:    EdgeTree,
}

impl CellularFloor {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn origin(&self) -> UV {
        self.origin
    }

    /// Total number of cells, walkable or not.
    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    /// Number of cells inside the walkable field.
    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| w).count()
    }

    /// Number of barrier edges of `kind`.
    pub fn barrier_count(&self, kind: BarrierKind) -> usize {
        self.tree(kind).size()
    }

    /// `(column, row)` of a cell id.
    #[inline]
    pub fn column_row(&self, cell: CellId) -> (u32, u32) {
        (cell.0 % self.columns, cell.0 / self.columns)
    }

    /// Iterator over every walkable cell, in id order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.walkable
            .iter()
            .enumerate()
            .filter(|(_, w)| **w)
            .map(|(i, _)| CellId(i as u32))
    }

    fn tree(&self, kind: BarrierKind) -> &EdgeTree {
        match kind {
            BarrierKind::Physical => &self.physical,
            BarrierKind::Visual   => &self.visual,
        }
    }

    fn cell_of(&self, column: i64, row: i64) -> Option<CellId> {
        if column < 0 || row < 0 || column >= self.columns as i64 || row >= self.rows as i64 {
            return None;
        }
        let id = row as u32 * self.columns + column as u32;
        self.walkable[id as usize].then_some(CellId(id))
    }
}

impl FloorQuery for CellularFloor {
    fn find_cell(&self, point: UV) -> Option<CellId> {
        if !point.is_finite() {
            return None;
        }
        let column = ((point.u - self.origin.u) / self.cell_size).floor();
        let row    = ((point.v - self.origin.v) / self.cell_size).floor();
        self.cell_of(column as i64, row as i64)
    }

    fn cell_at_offset(&self, cell: CellId, d_col: i32, d_row: i32) -> Option<CellId> {
        if cell.index() >= self.walkable.len() {
            return None;
        }
        let (column, row) = self.column_row(cell);
        self.cell_of(column as i64 + d_col as i64, row as i64 + d_row as i64)
    }

    fn cell_center(&self, cell: CellId) -> Option<UV> {
        if cell.index() >= self.walkable.len() {
            return None;
        }
        let (column, row) = self.column_row(cell);
        Some(UV::new(
            self.origin.u + (column as f64 + 0.5) * self.cell_size,
            self.origin.v + (row as f64 + 0.5) * self.cell_size,
        ))
    }

    fn colliding_edge(&self, point: UV, kind: BarrierKind) -> Option<CollisionAnalyzer> {
        self.find_cell(point)?;
        let analyzer = match self.tree(kind).nearest_neighbor(&[point.u, point.v]) {
            Some(line) => CollisionAnalyzer::against(
                point,
                BarrierEdge::new(UV::from(line.from), UV::from(line.to)),
            ),
            None => CollisionAnalyzer::unobstructed(point),
        };
        Some(analyzer)
    }

    fn crossing_edge(&self, from: UV, to: UV, kind: BarrierKind) -> Option<CollisionAnalyzer> {
        if !(from.is_finite() && to.is_finite()) {
            return None;
        }
        let sweep = AABB::from_corners(
            [from.u.min(to.u), from.v.min(to.v)],
            [from.u.max(to.u), from.v.max(to.v)],
        );
        self.tree(kind)
            .locate_in_envelope_intersecting(&sweep)
            .filter_map(|line| {
                let edge = BarrierEdge::new(UV::from(line.from), UV::from(line.to));
                edge.intersection(from, to).map(|(s, point)| (s, edge, point))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, edge, point)| CollisionAnalyzer::crossing(to, edge, point))
    }
}

// ── CellularFloorBuilder ──────────────────────────────────────────────────────

/// Construct a [`CellularFloor`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use occ_core::UV;
/// use occ_floor::{BarrierKind, CellularFloorBuilder, FloorQuery};
///
/// let floor = CellularFloorBuilder::new(UV::ZERO, 1.0, 10, 4)
///     .enclose(BarrierKind::Physical)
///     .build()
///     .unwrap();
/// assert_eq!(floor.cell_count(), 40);
/// assert!(floor.find_cell(UV::new(2.5, 1.5)).is_some());
/// ```
pub struct CellularFloorBuilder {
    origin:    UV,
    cell_size: f64,
    columns:   u32,
    rows:      u32,
    blocked:   Vec<(u32, u32)>,
    physical:  Vec<BarrierEdge>,
    visual:    Vec<BarrierEdge>,
}

impl CellularFloorBuilder {
    pub fn new(origin: UV, cell_size: f64, columns: u32, rows: u32) -> Self {
        Self {
            origin,
            cell_size,
            columns,
            rows,
            blocked:  Vec::new(),
            physical: Vec::new(),
            visual:   Vec::new(),
        }
    }

    /// Add one straight barrier segment to the `kind` layer.
    pub fn barrier(mut self, kind: BarrierKind, start: UV, end: UV) -> Self {
        let edge = BarrierEdge::new(start, end);
        match kind {
            BarrierKind::Physical => self.physical.push(edge),
            BarrierKind::Visual   => self.visual.push(edge),
        }
        self
    }

    /// Add a closed polygon outline (last vertex joins the first).
    pub fn polygon(mut self, kind: BarrierKind, vertices: &[UV]) -> Self {
        if vertices.len() < 2 {
            return self;
        }
        for i in 0..vertices.len() {
            let start = vertices[i];
            let end   = vertices[(i + 1) % vertices.len()];
            self = self.barrier(kind, start, end);
        }
        self
    }

    /// Add the grid's outer boundary as a barrier outline.
    pub fn enclose(self, kind: BarrierKind) -> Self {
        let w  = self.columns as f64 * self.cell_size;
        let h  = self.rows as f64 * self.cell_size;
        let o  = self.origin;
        let outline = [o, o + UV::new(w, 0.0), o + UV::new(w, h), o + UV::new(0.0, h)];
        self.polygon(kind, &outline)
    }

    /// Remove a cell from the walkable field.
    pub fn block_cell(mut self, column: u32, row: u32) -> Self {
        self.blocked.push((column, row));
        self
    }

    /// Validate the grid, build the walkable mask, and bulk-load the
    /// barrier R-trees.
    pub fn build(self) -> FloorResult<CellularFloor> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(FloorError::InvalidCellSize(self.cell_size));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(FloorError::EmptyGrid { columns: self.columns, rows: self.rows });
        }
        let cells = (self.columns as u64) * (self.rows as u64);
        if cells >= u32::MAX as u64 {
            return Err(FloorError::GridTooLarge { columns: self.columns, rows: self.rows });
        }

        let mut walkable = vec![true; cells as usize];
        for &(column, row) in &self.blocked {
            if column >= self.columns || row >= self.rows {
                return Err(FloorError::CellOutOfRange {
                    column,
                    row,
                    columns: self.columns,
                    rows:    self.rows,
                });
            }
            walkable[(row * self.columns + column) as usize] = false;
        }

        Ok(CellularFloor {
            origin:    self.origin,
            cell_size: self.cell_size,
            columns:   self.columns,
            rows:      self.rows,
            walkable,
            physical:  edge_tree(&self.physical)?,
            visual:    edge_tree(&self.visual)?,
        })
    }
}

fn edge_tree(edges: &[BarrierEdge]) -> FloorResult<EdgeTree> {
    let mut lines: Vec<Line<[f64; 2]>> = Vec::with_capacity(edges.len());
    for edge in edges {
        if !(edge.start.is_finite() && edge.end.is_finite()) {
            return Err(FloorError::NonFiniteBarrier);
        }
        lines.push(Line::new(edge.start.into(), edge.end.into()));
    }
    Ok(RTree::bulk_load(lines))
}
