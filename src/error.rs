use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RStarIndexError {
    /// A rectangle or point was built or compared against data of another dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Rectangle bounds are neither a single point nor strictly rectangular on every axis.
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// A node was constructed or mutated in a way that mixes leaf and internal contents.
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// A point id or child node is not present in the node it was removed from.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Fan-out parameters that cannot produce a valid tree.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, RStarIndexError>;
