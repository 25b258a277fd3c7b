//! Error kinds surfaced by the searcher.
//!
//! Every fallible operation returns [`Result`]. The only failure the core
//! recovers from internally is predictor load or per-query predictor
//! construction, which reverts the affected query to the baseline path; all
//! other errors abort the current operation.

use thiserror::Error;

/// Result type for omega-search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for the searcher lifecycle and query path.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation called in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Malformed parameters, dimension mismatch, or an unusable context.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `init` called twice without an intervening `cleanup`.
    #[error("searcher already initialized")]
    DuplicateInit,

    /// Search requested before `load`.
    #[error("searcher not loaded")]
    NotReady,

    /// An underlying fetch failed mid-operation.
    #[error("storage fault: {0}")]
    StorageFault(String),

    /// Cooperative cancellation observed; the context holds partial results.
    #[error("search cancelled")]
    Cancelled,

    /// Requested feature is not supported by the loaded configuration.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageFault(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::StorageFault(err.to_string())
    }
}
