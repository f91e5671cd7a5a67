//! An in-memory chain adapter for tests.
//!
//! Holds one chain's configuration state behind a lock and hands out
//! transactions whose payloads are serialized mock calls. Applying a
//! transaction back through [`MemoryAdapter::apply`] mutates the state,
//! which is what makes end-to-end idempotence tests possible: wire, apply,
//! wire again, expect nothing.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use omniwire_core::{Address, ConfigType, Eid, OmniPoint, Transaction};

use crate::error::{AdapterError, Result};
use crate::traits::{
    CallerBpsCapAdapter, ChainAdapter, CurrentLibrary, EnforcedOptionParam, LibraryTimeout,
};

/// Serialized form of a mock chain call; the payload of every transaction
/// this adapter produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Call {
    SetPeer { oapp: Address, eid: Eid, peer: Address },
    SetDelegate { oapp: Address, delegate: Address },
    SetOwner { oapp: Address, owner: Address },
    SetSendLibrary { oapp: Address, eid: Eid, library: Address },
    SetReceiveLibrary { oapp: Address, eid: Eid, library: Address, grace_period: u64 },
    SetReceiveLibraryTimeout { oapp: Address, eid: Eid, library: Address, expiry: u64 },
    SetConfig { oapp: Address, lib: Address, eid: Eid, config_type: ConfigType, config: Vec<u8> },
    SetEnforcedOptions { oapp: Address, params: Vec<EnforcedOptionParam> },
    SetCallerBpsCap { oapp: Address, cap: u64 },
}

#[derive(Debug, Default)]
struct ChainState {
    peers: HashMap<(Address, Eid), Address>,
    delegates: HashMap<Address, Address>,
    owners: HashMap<Address, Address>,
    send_libraries: HashMap<(Address, Eid), Address>,
    receive_libraries: HashMap<(Address, Eid), Address>,
    default_send_libraries: HashMap<Eid, Address>,
    default_receive_libraries: HashMap<Eid, Address>,
    receive_library_timeouts: HashMap<(Address, Eid), LibraryTimeout>,
    configs: HashMap<(Address, Address, Eid, ConfigType), Vec<u8>>,
    enforced_options: HashMap<(Address, Eid, u16), Vec<u8>>,
    caller_bps_caps: HashMap<Address, u64>,
    rpc_failure: Option<String>,
}

/// In-memory adapter for one chain.
pub struct MemoryAdapter {
    eid: Eid,
    state: RwLock<ChainState>,
    supports_caller_bps_cap: bool,
    strict_reads: bool,
}

impl MemoryAdapter {
    /// Create an adapter for one chain with empty state and the
    /// caller-bps-cap capability enabled.
    pub fn new(eid: Eid) -> Self {
        Self {
            eid,
            state: RwLock::new(ChainState::default()),
            supports_caller_bps_cap: true,
            strict_reads: false,
        }
    }

    /// Disable the caller-bps-cap capability, mimicking chain families
    /// without it.
    pub fn without_caller_bps_cap(mut self) -> Self {
        self.supports_caller_bps_cap = false;
        self
    }

    /// Make reads of never-configured domains fail with
    /// [`AdapterError::NotConfigured`] instead of returning an absent
    /// value, mimicking backends whose getters revert.
    pub fn with_strict_reads(mut self) -> Self {
        self.strict_reads = true;
        self
    }

    /// The endpoint this adapter serves.
    pub fn eid(&self) -> Eid {
        self.eid
    }

    /// Make every subsequent read fail with an RPC error.
    pub async fn poison(&self, message: impl Into<String>) {
        self.state.write().await.rpc_failure = Some(message.into());
    }

    /// Seed the chain-default libraries toward a remote endpoint.
    pub async fn set_default_libraries(&self, eid: Eid, send: Address, receive: Address) {
        let mut state = self.state.write().await;
        state.default_send_libraries.insert(eid, send);
        state.default_receive_libraries.insert(eid, receive);
    }

    /// Seed a raw enforced-options blob, bypassing the codec. Used to
    /// exercise sentinel handling (`0x00` empty documents).
    pub async fn seed_enforced_options(
        &self,
        oapp: Address,
        eid: Eid,
        msg_type: u16,
        options: Vec<u8>,
    ) {
        let mut state = self.state.write().await;
        state.enforced_options.insert((oapp, eid, msg_type), options);
    }

    /// Seed raw config bytes for `(oapp, lib, eid, config_type)`.
    pub async fn seed_config(
        &self,
        oapp: Address,
        lib: Address,
        eid: Eid,
        config_type: ConfigType,
        config: Vec<u8>,
    ) {
        let mut state = self.state.write().await;
        state.configs.insert((oapp, lib, eid, config_type), config);
    }

    /// Apply a transaction previously produced by this adapter.
    pub async fn apply(&self, tx: &Transaction) -> Result<()> {
        tracing::debug!(oapp = %tx.target, description = %tx.description, "applying mock transaction");
        let call: Call = serde_json::from_slice(&tx.payload)
            .map_err(|e| AdapterError::Rpc(format!("malformed mock payload: {e}")))?;
        let mut state = self.state.write().await;
        match call {
            Call::SetPeer { oapp, eid, peer } => {
                state.peers.insert((oapp, eid), peer);
            }
            Call::SetDelegate { oapp, delegate } => {
                state.delegates.insert(oapp, delegate);
            }
            Call::SetOwner { oapp, owner } => {
                state.owners.insert(oapp, owner);
            }
            Call::SetSendLibrary { oapp, eid, library } => {
                state.send_libraries.insert((oapp, eid), library);
            }
            Call::SetReceiveLibrary { oapp, eid, library, .. } => {
                state.receive_libraries.insert((oapp, eid), library);
            }
            Call::SetReceiveLibraryTimeout { oapp, eid, library, expiry } => {
                state
                    .receive_library_timeouts
                    .insert((oapp, eid), LibraryTimeout { lib: library, expiry });
            }
            Call::SetConfig { oapp, lib, eid, config_type, config } => {
                state.configs.insert((oapp, lib, eid, config_type), config);
            }
            Call::SetEnforcedOptions { oapp, params } => {
                for param in params {
                    state
                        .enforced_options
                        .insert((oapp, param.eid, param.msg_type), param.options);
                }
            }
            Call::SetCallerBpsCap { oapp, cap } => {
                state.caller_bps_caps.insert(oapp, cap);
            }
        }
        Ok(())
    }

    fn transaction(&self, target: &OmniPoint, call: Call, description: String) -> Result<Transaction> {
        let payload = serde_json::to_vec(&call)
            .map_err(|e| AdapterError::Rpc(format!("mock payload encoding: {e}")))?;
        Ok(Transaction::new(*target, payload, description))
    }

    fn check(&self, state: &ChainState) -> Result<()> {
        match &state.rpc_failure {
            Some(message) => Err(AdapterError::Rpc(message.clone())),
            None => Ok(()),
        }
    }

    fn missing<T>(&self) -> Result<Option<T>> {
        if self.strict_reads {
            Err(AdapterError::NotConfigured)
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl ChainAdapter for MemoryAdapter {
    async fn get_peer(&self, oapp: &OmniPoint, eid: Eid) -> Result<Option<Address>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.peers.get(&(oapp.address, eid)) {
            Some(peer) => Ok(Some(*peer)),
            None => self.missing(),
        }
    }

    async fn set_peer(&self, oapp: &OmniPoint, eid: Eid, peer: Address) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetPeer { oapp: oapp.address, eid, peer },
            format!("Set peer for {oapp} on eid {eid}"),
        )
    }

    async fn get_delegate(&self, oapp: &OmniPoint) -> Result<Option<Address>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.delegates.get(&oapp.address) {
            Some(delegate) => Ok(Some(*delegate)),
            None => self.missing(),
        }
    }

    async fn set_delegate(&self, oapp: &OmniPoint, delegate: Address) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetDelegate { oapp: oapp.address, delegate },
            format!("Set delegate for {oapp}"),
        )
    }

    async fn get_owner(&self, oapp: &OmniPoint) -> Result<Option<Address>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.owners.get(&oapp.address) {
            Some(owner) => Ok(Some(*owner)),
            None => self.missing(),
        }
    }

    async fn set_owner(&self, oapp: &OmniPoint, owner: Address) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetOwner { oapp: oapp.address, owner },
            format!("Transfer ownership of {oapp}"),
        )
    }

    async fn get_send_library(&self, oapp: &OmniPoint, eid: Eid) -> Result<CurrentLibrary> {
        let state = self.state.read().await;
        self.check(&state)?;
        if let Some(library) = state.send_libraries.get(&(oapp.address, eid)) {
            return Ok(CurrentLibrary::pinned(*library));
        }
        match state.default_send_libraries.get(&eid) {
            Some(library) => Ok(CurrentLibrary::fallback(*library)),
            None => Ok(CurrentLibrary::unset()),
        }
    }

    async fn set_send_library(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
    ) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetSendLibrary { oapp: oapp.address, eid, library },
            format!("Set send library for {oapp} on eid {eid}"),
        )
    }

    async fn get_receive_library(&self, oapp: &OmniPoint, eid: Eid) -> Result<CurrentLibrary> {
        let state = self.state.read().await;
        self.check(&state)?;
        if let Some(library) = state.receive_libraries.get(&(oapp.address, eid)) {
            return Ok(CurrentLibrary::pinned(*library));
        }
        match state.default_receive_libraries.get(&eid) {
            Some(library) => Ok(CurrentLibrary::fallback(*library)),
            None => Ok(CurrentLibrary::unset()),
        }
    }

    async fn set_receive_library(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
        grace_period: u64,
    ) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetReceiveLibrary { oapp: oapp.address, eid, library, grace_period },
            format!("Set receive library for {oapp} on eid {eid}"),
        )
    }

    async fn get_receive_library_timeout(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
    ) -> Result<Option<LibraryTimeout>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.receive_library_timeouts.get(&(oapp.address, eid)) {
            Some(timeout) => Ok(Some(*timeout)),
            None => self.missing(),
        }
    }

    async fn set_receive_library_timeout(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        library: Address,
        expiry: u64,
    ) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetReceiveLibraryTimeout { oapp: oapp.address, eid, library, expiry },
            format!("Set receive library timeout for {oapp} on eid {eid}"),
        )
    }

    async fn get_config(
        &self,
        oapp: &OmniPoint,
        lib: Address,
        eid: Eid,
        config_type: ConfigType,
    ) -> Result<Option<Bytes>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.configs.get(&(oapp.address, lib, eid, config_type)) {
            Some(config) => Ok(Some(Bytes::from(config.clone()))),
            None => self.missing(),
        }
    }

    async fn set_config(
        &self,
        oapp: &OmniPoint,
        lib: Address,
        eid: Eid,
        config_type: ConfigType,
        config: Bytes,
    ) -> Result<Transaction> {
        let label = match config_type {
            ConfigType::Executor => "executor",
            ConfigType::SendUln => "send ULN",
            ConfigType::RecvUln => "receive ULN",
        };
        self.transaction(
            oapp,
            Call::SetConfig {
                oapp: oapp.address,
                lib,
                eid,
                config_type,
                config: config.to_vec(),
            },
            format!("Set {label} config for {oapp} on eid {eid}"),
        )
    }

    async fn get_enforced_options(
        &self,
        oapp: &OmniPoint,
        eid: Eid,
        msg_type: u16,
    ) -> Result<Bytes> {
        let state = self.state.read().await;
        self.check(&state)?;
        Ok(state
            .enforced_options
            .get(&(oapp.address, eid, msg_type))
            .map(|options| Bytes::from(options.clone()))
            .unwrap_or_default())
    }

    async fn set_enforced_options(
        &self,
        oapp: &OmniPoint,
        params: Vec<EnforcedOptionParam>,
    ) -> Result<Transaction> {
        let pairs = params.len();
        self.transaction(
            oapp,
            Call::SetEnforcedOptions { oapp: oapp.address, params },
            format!("Set enforced options for {oapp} ({pairs} msg type(s))"),
        )
    }

    fn caller_bps_cap(&self) -> Option<&dyn CallerBpsCapAdapter> {
        if self.supports_caller_bps_cap {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl CallerBpsCapAdapter for MemoryAdapter {
    async fn get_caller_bps_cap(&self, oapp: &OmniPoint) -> Result<Option<u64>> {
        let state = self.state.read().await;
        self.check(&state)?;
        match state.caller_bps_caps.get(&oapp.address) {
            Some(cap) => Ok(Some(*cap)),
            None => self.missing(),
        }
    }

    async fn set_caller_bps_cap(&self, oapp: &OmniPoint, cap: u64) -> Result<Transaction> {
        self.transaction(
            oapp,
            Call::SetCallerBpsCap { oapp: oapp.address, cap },
            format!("Set caller bps cap for {oapp}"),
        )
    }
}
