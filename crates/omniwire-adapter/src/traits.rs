//! Chain adapter trait: the uniform read/write surface over one chain
//! family.
//!
//! One implementation exists per chain family (EVM-like, Move-like,
//! account-model-like). Getters return normalized values; setters return
//! [`Transaction`] descriptors for the external signer and never submit
//! anything themselves. Rate limiting, retry and nonce sequencing live in
//! the adapter, not in the engine.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use omniwire_core::{Address, ConfigType, Eid, OmniPoint, Transaction};

use crate::error::Result;

/// A message library as currently resolved by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentLibrary {
    /// The resolved library address; `None` when the chain has neither an
    /// app-specific setting nor a default.
    pub address: Option<Address>,
    /// Whether the resolved value is the chain default rather than an
    /// app-specific setting.
    pub is_default: bool,
}

impl CurrentLibrary {
    /// A library pinned explicitly by the application.
    pub fn pinned(address: Address) -> Self {
        Self { address: Some(address), is_default: false }
    }

    /// A library resolved from the chain default.
    pub fn fallback(address: Address) -> Self {
        Self { address: Some(address), is_default: true }
    }

    /// No library resolvable at all.
    pub fn unset() -> Self {
        Self { address: None, is_default: true }
    }
}

/// An expiring fallback to an old receive library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTimeout {
    pub lib: Address,
    pub expiry: u64,
}

/// One `(remote, msg_type)` enforced-options blob in a batched setter call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcedOptionParam {
    pub eid: Eid,
    pub msg_type: u16,
    pub options: Vec<u8>,
}

/// The read/write surface of one chain family.
///
/// Implementations must be thread-safe (`Send + Sync`); the engine fans
/// reads out concurrently.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Read the peer registered for `(oapp, remote eid)`, if any.
    async fn get_peer(&self, oapp: &OmniPoint, eid: Eid) -> Result<Option<Address>>;

    /// Build a transaction registering `peer` for `(oapp, remote eid)`.
    async fn set_peer(&self, oapp: &OmniPoint, eid: Eid, peer: Address) -> Result<Transaction>;

    /// Read the current delegate for `oapp`, if any.
    async fn get_delegate(&self, oapp: &OmniPoint) -> Result<Option<Address>>;

    /// Build a transaction setting the delegate for `oapp`.
    async fn set_delegate(&self, oapp: &OmniPoint, delegate: Address) -> Result<Transaction>;

    /// Read the current owner of `oapp`, if any.
    async fn get_owner(&self, oapp: &OmniPoint) -> Result<Option<Address>>;

    /// Build a transaction transferring ownership of `oapp`.
    async fn set_owner(&self, oapp: &OmniPoint, owner: Address) -> Result<Transaction>;

    /// Resolve the send library for `(oapp, remote eid)`.
    async fn get_send_library(&self, oapp: &OmniPoint, eid: Eid) -> Result<CurrentLibrary>;

    /// Build a transaction pinning the send library, argument order
    /// `(oapp, eid, library)`.
    async fn set_send_library(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
    ) -> Result<Transaction>;

    /// Resolve the receive library for `(oapp, remote eid)`.
    async fn get_receive_library(&self, oapp: &OmniPoint, eid: Eid) -> Result<CurrentLibrary>;

    /// Build a transaction pinning the receive library, argument order
    /// `(oapp, eid, library, grace_period)`.
    async fn set_receive_library(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
        grace_period: u64,
    ) -> Result<Transaction>;

    /// Read the receive-library timeout for `(oapp, remote eid)`, if set.
    async fn get_receive_library_timeout(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
    ) -> Result<Option<LibraryTimeout>>;

    /// Build a transaction setting the receive-library timeout, argument
    /// order `(oapp, eid, library, expiry)`.
    async fn set_receive_library_timeout(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
        expiry: u64,
    ) -> Result<Transaction>;

    /// Read the raw config bytes for `(oapp, lib, remote eid, config type)`.
    ///
    /// `None` means the domain has never been configured.
    async fn get_config(
        &self,
        oapp: &OmniPoint,
        lib: Address,
        eid: Eid,
        config_type: ConfigType,
    ) -> Result<Option<Bytes>>;

    /// Build a transaction writing config bytes through `lib`.
    async fn set_config(
        &self,
        oapp: &OmniPoint,
        lib: Address,
        eid: Eid,
        config_type: ConfigType,
        config: Bytes,
    ) -> Result<Transaction>;

    /// Read the enforced-options blob for `(oapp, remote eid, msg_type)`.
    ///
    /// Empty bytes mean "no enforced options"; some chains report the
    /// single-zero-byte empty document instead.
    async fn get_enforced_options(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        msg_type: u16,
    ) -> Result<Bytes>;

    /// Build one batched transaction setting enforced options for several
    /// `(remote, msg_type)` pairs on `oapp`.
    ///
    /// Adapters for chains without a batched setter may emit a multicall
    /// payload or reject batches larger than one; that choice is
    /// adapter-level.
    async fn set_enforced_options(
        &self,
        oapp: &OmniPoint,
        params: Vec<EnforcedOptionParam>,
    ) -> Result<Transaction>;

    /// The caller-bps-cap capability, where the chain family supports it.
    ///
    /// Returning `None` is not an error; the engine silently skips the
    /// domain. This replaces call-and-catch probing with a typed query.
    fn caller_bps_cap(&self) -> Option<&dyn CallerBpsCapAdapter>;
}

impl std::fmt::Debug for dyn ChainAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ChainAdapter")
    }
}

/// Optional capability: caller basis-point caps.
#[async_trait]
pub trait CallerBpsCapAdapter: Send + Sync {
    /// Read the current cap for `oapp`, if set.
    async fn get_caller_bps_cap(&self, oapp: &OmniPoint) -> Result<Option<u64>>;

    /// Build a transaction setting the cap for `oapp`.
    async fn set_caller_bps_cap(&self, oapp: &OmniPoint, cap: u64) -> Result<Transaction>;
}
