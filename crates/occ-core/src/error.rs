//! Framework error type.
//!
//! Sub-crates define their own error enums; configuration problems that can
//! be detected before a run starts are reported through `CoreError`.

use thiserror::Error;

/// Errors raised while building or validating run configuration.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown engine parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{name}' must be {requirement}, got {value}")]
    OutOfRange {
        name:        &'static str,
        requirement: &'static str,
        value:       f64,
    },
}

/// Shorthand result type for `occ-core`.
pub type CoreResult<T> = Result<T, CoreError>;
