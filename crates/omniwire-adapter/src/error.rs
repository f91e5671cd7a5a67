//! Error types for chain adapters.

use omniwire_core::Eid;
use thiserror::Error;

/// Errors surfaced by a chain adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The queried domain has never been configured on-chain.
    ///
    /// Recoverable: the engine treats this as "current = chain default /
    /// absent" rather than failing the run.
    #[error("not configured")]
    NotConfigured,

    /// Unexpected backend failure (RPC outage, malformed response).
    #[error("rpc error: {0}")]
    Rpc(String),

    /// No adapter is registered for the endpoint.
    #[error("no adapter registered for eid {0}")]
    NoAdapter(Eid),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
