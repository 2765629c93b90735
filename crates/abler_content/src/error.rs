//! Content lookup and loading errors.

use thiserror::Error;

/// Errors from the content factories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// No template for this archetype.
    #[error("unknown unit archetype: {0}")]
    UnknownArchetype(String),

    /// No skill by this name.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// No item by this name.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Template data failed to parse.
    #[error("failed to parse content data: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Template data parsed but is unusable.
    #[error("invalid content data: {0}")]
    Invalid(String),
}

/// Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;
