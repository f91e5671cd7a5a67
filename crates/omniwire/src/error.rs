//! Error types for the reconciliation engine.

use thiserror::Error;

use omniwire_adapter::AdapterError;
use omniwire_core::{CodecError, ConfigError};

/// Errors that can occur during a reconciliation run.
#[derive(Debug, Error)]
pub enum WireError {
    /// Fatal pre-flight declaration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// On-chain bytes for a pathway failed to decode.
    #[error("malformed on-chain config for pathway {pathway}: {source}")]
    Codec {
        pathway: String,
        #[source]
        source: CodecError,
    },

    /// An adapter read or build failed unexpectedly.
    ///
    /// Carries the pathway and domain so a failure in one pathway does not
    /// obscure which read broke. Results already computed for other
    /// pathways are unaffected.
    #[error("{domain} configuration failed for pathway {pathway}: {source}")]
    Adapter {
        pathway: String,
        domain: &'static str,
        #[source]
        source: AdapterError,
    },

    /// A ULN or executor config was declared but no library is set in the
    /// declaration and the chain reports no default.
    #[error("no {domain} library set for pathway {pathway} and no chain default exists")]
    MissingLibrary {
        pathway: String,
        domain: &'static str,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, WireError>;
