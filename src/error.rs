//! Error types for rank-insights
//!
//! Data-shape irregularities in a ranking payload are never errors; they are
//! reported as [`Diagnostic`](crate::diagnostics::Diagnostic) values next to the
//! analysis. `Error` covers misuse of the API and undecodable JSON only.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// rank-insights error types
#[derive(Error, Debug)]
pub enum Error {
    /// A query named a category that the experiment never declared
    #[error("Unknown category: {0}\nOnly categories declared by the experiment can be queried")]
    UnknownCategory(String),

    /// A query named a brand that the experiment never declared
    #[error("Unknown brand: {0}\nOnly brands declared by the experiment can be queried")]
    UnknownBrand(String),

    /// Engine configuration rejected by the builder
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Payload or configuration JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
