use occ_core::CellId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EscapeError {
    #[error("escape route from {cell} has a non-finite destination or cost")]
    NonFinite { cell: CellId },

    #[error("waypoint tour needs at least one waypoint")]
    EmptyTour,
}

pub type EscapeResult<T> = Result<T, EscapeError>;
