use occ_core::{CoreError, UV};
use thiserror::Error;

/// Failures that end an agent's run.
///
/// Both data-integrity variants point at malformed floor geometry or a
/// degenerate contact; the engine state is left as it was before the
/// failing step.
#[derive(Debug, Error, PartialEq)]
pub enum MotionError {
    #[error("no barrier information at {location}; point lies outside the walkable field")]
    NoBarrierInfo { location: UV },

    #[error("contact detected at {location} but the collision could not be resolved")]
    UnresolvedContact { location: UV },

    #[error("agent at {location} has no heading")]
    DegenerateHeading { location: UV },

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type MotionResult<T> = Result<T, MotionError>;
