//! Per-cell visit counts.

use occ_core::CellId;

#[cfg(feature = "fx-hash")]
type CellMap<V> = rustc_hash::FxHashMap<CellId, V>;
#[cfg(not(feature = "fx-hash"))]
type CellMap<V> = std::collections::HashMap<CellId, V>;

/// How many fixed ticks ended with an agent inside each cell.
///
/// One record per agent per tick, so `total()` equals the number of ticks
/// simulated (summed over agents once histograms are merged).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitHistogram {
    counts: CellMap<u64>,
    total:  u64,
}

impl VisitHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cell: CellId) {
        *self.counts.entry(cell).or_default() += 1;
        self.total += 1;
    }

    pub fn count(&self, cell: CellId) -> u64 {
        self.counts.get(&cell).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct cells visited at least once.
    pub fn distinct_cells(&self) -> usize {
        self.counts.len()
    }

    /// Share of all records that fell into `cell`, in `[0, 1]`.
    pub fn frequency(&self, cell: CellId) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(cell) as f64 / self.total as f64
    }

    /// `(cell, count)` pairs in ascending cell order.
    pub fn sorted(&self) -> Vec<(CellId, u64)> {
        let mut pairs: Vec<(CellId, u64)> = self.counts.iter().map(|(&c, &n)| (c, n)).collect();
        pairs.sort_unstable_by_key(|&(c, _)| c);
        pairs
    }

    /// Add every count of `other` into `self`.
    pub fn merge(&mut self, other: &VisitHistogram) {
        for (&cell, &n) in &other.counts {
            *self.counts.entry(cell).or_default() += n;
        }
        self.total += other.total;
    }
}
