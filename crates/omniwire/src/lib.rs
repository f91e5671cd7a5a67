//! # omniwire
//!
//! Reconciles declarative cross-chain pathway configuration for omnichain
//! applications: given a graph of contracts and pathways and adapters for
//! the chains involved, produces the minimal, idempotent, ordered list of
//! transactions that brings live contract state into agreement with the
//! declaration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use omniwire::{wire, AdapterRegistry, OmniGraph};
//!
//! let graph: OmniGraph = serde_json::from_str(&declaration)?;
//! let transactions = wire(&graph, &adapters).await?;
//! // Hand `transactions` to your signer/broadcaster.
//! ```
//!
//! ## Guarantees
//!
//! - **Idempotence**: a run against already-satisfied state emits nothing.
//! - **Determinism**: output order follows the fixed domain order and the
//!   declaration order of contracts and connections.
//! - **Isolation**: a failing pathway surfaces with pathway and domain
//!   context; it does not corrupt results computed for other pathways.

pub mod configure;
pub mod driver;
pub mod error;

pub use driver::wire;
pub use error::{Result, WireError};

// The full public surface, re-exported so downstream callers depend on a
// single crate.
pub use omniwire_adapter::{
    AdapterError, AdapterRegistry, CallerBpsCapAdapter, ChainAdapter, CurrentLibrary,
    EnforcedOptionParam, LibraryTimeout, MemoryAdapter,
};
pub use omniwire_core::{
    build_enforced_options, is_no_options, Address, CodecError, ConfigError, ConfigType,
    Connection, ContractNode, EdgeConfig, Eid, EnforcedOption, ExecutorConfig, ExecutorOptionType,
    NodeConfig, OmniGraph, OmniPoint, Options, ReceiveConfig, ReceiveLibraryConfig,
    ReceiveLibraryTimeoutConfig, SendConfig, Transaction, UlnConfig, UlnUserConfig,
};
