//! Error types for the idolstage view controller
//!
//! Missing markup is never an error: components skip what they cannot find.
//! These variants cover malformed input handed to the controller.

use thiserror::Error;

use crate::dom::NodeId;

/// Main error type for idolstage operations
#[derive(Error, Debug)]
pub enum StageError {
    /// Selector text could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Node id does not belong to the document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A required part of the host document is unavailable (window, body, head)
    #[error("Document unavailable: {0}")]
    DocumentUnavailable(&'static str),

    /// Page layout description is inconsistent
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Error during JSON serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using StageError
pub type StageResult<T> = Result<T, StageError>;
