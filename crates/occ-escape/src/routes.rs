//! Precomputed escape-route table.
//!
//! The table is produced outside the engine (by the visibility /
//! escape-route precomputation) and handed over read-only.  It maps each
//! walkable cell to the destinations an agent standing there may pick.

use std::collections::HashMap;

use occ_core::{CellId, UV};
use occ_floor::FloorQuery;

use crate::{EscapeError, EscapeResult};

/// Half-width of the neighbourhood searched when a cell has no entry
/// (2 → a 5 x 5 block).
const NEIGHBOURHOOD_RADIUS: i32 = 2;

/// One reachable destination and how undesirable it is.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentCellDestination {
    pub destination:       UV,
    pub desirability_cost: f64,
}

impl AgentCellDestination {
    pub fn new(destination: UV, desirability_cost: f64) -> Self {
        Self { destination, desirability_cost }
    }
}

/// Escape routes as seen from one vantage cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellEscapeRoutes {
    pub vantage_cell: CellId,
    pub destinations: Vec<AgentCellDestination>,
}

/// `CellId → CellEscapeRoutes`, read-only once handed to the engine.
#[derive(Clone, Debug, Default)]
pub struct EscapeRoutes {
    inner: HashMap<CellId, CellEscapeRoutes>,
}

impl EscapeRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the destinations reachable from `cell`.
    ///
    /// Replaces any previous entry.  Non-finite destinations or costs are
    /// rejected so the selector never has to guard against them.
    pub fn insert(
        &mut self,
        cell:         CellId,
        destinations: Vec<AgentCellDestination>,
    ) -> EscapeResult<()> {
        let bad = destinations
            .iter()
            .any(|d| !d.destination.is_finite() || !d.desirability_cost.is_finite());
        if bad {
            return Err(EscapeError::NonFinite { cell });
        }
        self.inner.insert(cell, CellEscapeRoutes { vantage_cell: cell, destinations });
        Ok(())
    }

    pub fn get(&self, cell: CellId) -> Option<&CellEscapeRoutes> {
        self.inner.get(&cell)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Routes for `cell`, or for the nearest cell of its 5 x 5
    /// neighbourhood that has an entry.
    ///
    /// Rings are searched from the inside out; within a ring, row by row.
    /// Entries with an empty destination list are skipped.
    pub fn routes_near(&self, floor: &dyn FloorQuery, cell: CellId) -> Option<&CellEscapeRoutes> {
        if let Some(routes) = self.usable(cell) {
            return Some(routes);
        }
        for ring in 1..=NEIGHBOURHOOD_RADIUS {
            for d_row in -ring..=ring {
                for d_col in -ring..=ring {
                    if d_row.abs() != ring && d_col.abs() != ring {
                        continue;
                    }
                    let found = floor
                        .cell_at_offset(cell, d_col, d_row)
                        .and_then(|neighbour| self.usable(neighbour));
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }
        None
    }

    fn usable(&self, cell: CellId) -> Option<&CellEscapeRoutes> {
        self.inner.get(&cell).filter(|r| !r.destinations.is_empty())
    }
}
