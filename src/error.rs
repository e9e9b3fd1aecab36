//! Error types for belt-slots.

use thiserror::Error;

/// Result type for belt-slots operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised by geometry queries, template validation and persistence.
///
/// Routine outcomes such as "no matching slot" or "slot occupied" are not
/// errors and never show up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Belt progress was negative or past the tolerated end of the belt.
    #[error("invalid belt progress {progress} (allowed 0..={max})")]
    InvalidProgress { progress: f32, max: f32 },

    /// Content data describes a belt or slot layout that cannot exist.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An acceptor slot template accepts from no direction at all.
    #[error("acceptor slot {slot} has an empty direction set")]
    EmptyDirectionSet { slot: usize },

    /// A save file was written by an incompatible version.
    #[error("unsupported save version: expected {expected}, found {found}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
