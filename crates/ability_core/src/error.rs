//! Error types for the ability framework.
//!
//! Ability commands never return these: a refused command is a plain `false`.
//! Errors belong to the layers around the state machines - content loading,
//! host simulation lookups and snapshot serialization.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`AbilityError`].
pub type Result<T> = std::result::Result<T, AbilityError>;

/// Top-level error type for the ability framework.
#[derive(Debug, Error)]
pub enum AbilityError {
    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A status effect name was declared twice.
    #[error("Duplicate status effect: {0}")]
    DuplicateStatus(String),

    /// A status effect name could not be resolved.
    #[error("Unknown status effect '{name}' referenced by {referenced_by}")]
    UnknownStatus {
        /// The unresolved name.
        name: String,
        /// What referenced it (a status or a unit type).
        referenced_by: String,
    },

    /// A unit type name was declared twice.
    #[error("Duplicate unit type: {0}")]
    DuplicateUnitType(String),

    /// A unit type name could not be resolved.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// Content failed a semantic check.
    #[error("Invalid content in '{owner}': {message}")]
    InvalidContent {
        /// Status or unit type that failed.
        owner: String,
        /// What is wrong with it.
        message: String,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Invalid simulation state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
