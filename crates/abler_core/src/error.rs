//! Error types for the combat engine.

use thiserror::Error;

use crate::unit::UnitId;

/// Result type alias using [`BoardError`].
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors produced by board placement and movement.
///
/// Everything else in the engine is infallible: lookups of vanished
/// units return `None` and actions on them are silently skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Coordinates fall outside the board.
    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Board width.
        width: i32,
        /// Board height.
        height: i32,
    },

    /// Another unit already stands on the cell.
    #[error("position ({x}, {y}) is occupied by unit {occupant}")]
    Occupied {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Unit currently standing there.
        occupant: UnitId,
    },

    /// The unit is not on this board.
    #[error("unit {0} is not on the board")]
    UnknownUnit(UnitId),
}

/// Errors produced while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON text could not be parsed.
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A value was parsed but makes no sense.
    #[error("invalid combat config: {0}")]
    Invalid(String),
}
