//! # omniwire Core
//!
//! Pure primitives for the omniwire reconciliation engine: the pathway
//! graph model, config normalizers, and the executor options codec.
//!
//! This crate contains no I/O, no chain access, no async. It is pure
//! computation over configuration data.
//!
//! ## Key Types
//!
//! - [`OmniGraph`] - The declarative graph of contracts and pathways
//! - [`OmniPoint`] - A contract instance on a specific chain
//! - [`UlnConfig`] - Canonical verification config with use-default flags
//! - [`Options`] - Accumulating builder for the executor options blob
//! - [`Transaction`] - The descriptor handed to external signers
//!
//! ## Canonical Serialization
//!
//! Config equality is decided by serializing both sides to canonical bytes
//! (DVN sets sorted) and comparing byte-for-byte. See [`uln`] and
//! [`executor`].

pub mod error;
pub mod executor;
pub mod graph;
pub mod options;
pub mod transaction;
pub mod types;
pub mod uln;

pub use error::{CodecError, ConfigError};
pub use executor::ExecutorConfig;
pub use graph::{
    Connection, ContractNode, EdgeConfig, NodeConfig, OmniGraph, ReceiveConfig,
    ReceiveLibraryConfig, ReceiveLibraryTimeoutConfig, SendConfig,
};
pub use options::{
    build_enforced_options, is_no_options, EnforcedOption, ExecutorOptionType, Options,
    EXECUTOR_WORKER_ID,
};
pub use transaction::Transaction;
pub use types::{Address, ConfigType, Eid, OmniPoint};
pub use uln::{UlnConfig, UlnUserConfig, NIL_DVN_COUNT};
