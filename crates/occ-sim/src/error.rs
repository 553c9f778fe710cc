use occ_core::{Tick, UV};
use occ_motion::MotionError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent location {location} at {tick} maps to no cell")]
    UnmappedLocation { location: UV, tick: Tick },

    #[error("{tick} not finished after {limit} sub-steps")]
    SubStepLimit { tick: Tick, limit: usize },

    #[error("motion error: {0}")]
    Motion(#[from] MotionError),
}

pub type SimResult<T> = Result<T, SimError>;
