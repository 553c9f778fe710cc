//! Floor-subsystem error type.

use thiserror::Error;

/// Errors produced while building a floor.
#[derive(Debug, Error, PartialEq)]
pub enum FloorError {
    #[error("cell size must be finite and > 0, got {0}")]
    InvalidCellSize(f64),

    #[error("grid must have at least one row and one column, got {columns}x{rows}")]
    EmptyGrid { columns: u32, rows: u32 },

    #[error("grid of {columns}x{rows} cells exceeds the addressable cell range")]
    GridTooLarge { columns: u32, rows: u32 },

    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} grid")]
    CellOutOfRange { column: u32, row: u32, columns: u32, rows: u32 },

    #[error("barrier edge has a non-finite endpoint")]
    NonFiniteBarrier,
}

pub type FloorResult<T> = Result<T, FloorError>;
