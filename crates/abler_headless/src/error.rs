//! Error types for the headless runner.

use abler_content::ContentError;
use abler_core::error::{BoardError, ConfigError};
use thiserror::Error;

use crate::game::Phase;

/// Result type alias using [`RunnerError`].
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Everything that can stop a match or a batch.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Results could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A setup file is not valid RON.
    #[error("failed to parse setup: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// A unit, skill or item name did not resolve.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The combat config was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A unit could not be placed.
    #[error(transparent)]
    Placement(#[from] BoardError),

    /// Two owned units share a home cell.
    #[error("home cell ({x}, {y}) is already taken")]
    HomeTaken {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },

    /// The operation is not allowed in the current phase.
    #[error("expected the {expected:?} phase but the match is in {actual:?}")]
    WrongPhase {
        /// Phase the operation needs.
        expected: Phase,
        /// Phase the match is in.
        actual: Phase,
    },

    /// The match has already ended.
    #[error("the match is over")]
    GameOver,
}
