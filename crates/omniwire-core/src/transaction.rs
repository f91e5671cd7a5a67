//! Transaction descriptors: the engine's only output type.
//!
//! A descriptor carries an opaque, chain-specific payload produced by a
//! chain adapter, the contract it targets, and a human-readable description
//! for signer UIs and logs. Descriptors are created fresh per run and have
//! no identity beyond the run that produced them.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::OmniPoint;

/// A transaction the external signer/broadcaster must submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The contract instance the transaction targets.
    pub target: OmniPoint,
    /// Opaque chain-specific call data; only the producing adapter can
    /// interpret it.
    pub payload: Bytes,
    /// What the transaction does, for humans.
    pub description: String,
}

impl Transaction {
    /// Create a new descriptor.
    pub fn new(target: OmniPoint, payload: impl Into<Bytes>, description: impl Into<String>) -> Self {
        Self {
            target,
            payload: payload.into(),
            description: description.into(),
        }
    }
}
