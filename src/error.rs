//! Error types for hashq.

use thiserror::Error;

use crate::model::RequestId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no result for request {0}")]
    NotFound(String),

    #[error("service is draining, not accepting new work")]
    ShuttingDown,

    /// A digest was published twice for the same request. Identifiers are
    /// unique, so this means the counter or queue contract was broken.
    #[error("duplicate result for request {0}")]
    DuplicateResult(RequestId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
