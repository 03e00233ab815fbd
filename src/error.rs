// src/error.rs

use thiserror::Error;

/// Core error types for depsolv
#[derive(Error, Debug)]
pub enum Error {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unit payload (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database not found
    #[error("Database not found at path: {0}")]
    DatabaseNotFound(String),

    /// A unit record that cannot be turned into a graph node
    #[error("Malformed unit record: {0}")]
    MalformedUnit(String),

    /// Unit kind with no registered node factory; fatal for the whole load
    #[error("Unknown unit kind: {0}")]
    UnknownUnitKind(String),

    /// A dependency slot name outside the fixed slot table
    #[error("Unknown dependency slot: {0}")]
    UnknownSlot(String),

    /// A flags token outside the fixed operator table
    #[error("Unknown dependency operator: {0}")]
    UnknownOperator(String),

    /// A projector targeting an attribute the node does not carry
    #[error("Unknown node attribute: {0}")]
    UnknownAttribute(String),

    /// Rich dependency strings that do not parse
    #[error("Invalid rich dependency '{input}': {reason}")]
    RichDependency { input: String, reason: String },

    /// EVR strings that do not parse
    #[error("Invalid EVR '{0}': {1}")]
    InvalidEvr(String, String),

    /// Mutating a graph after it has been finalized
    #[error("Graph '{0}' is finalized")]
    GraphFinalized(String),

    /// Building a job from a unit the registry has never seen
    #[error("Unit '{0}' is not registered in any loaded graph")]
    Unregistered(String),
}

/// Result type alias using depsolv's Error type
pub type Result<T> = std::result::Result<T, Error>;
