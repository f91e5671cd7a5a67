//! # omniwire Adapter
//!
//! The chain adapter abstraction: a uniform async read/write surface over
//! one chain family, consumed by the reconciliation engine.
//!
//! ## Key Types
//!
//! - [`ChainAdapter`] - Getters for current state, setters returning
//!   [`Transaction`](omniwire_core::Transaction) descriptors
//! - [`CallerBpsCapAdapter`] - Typed optional capability sub-interface
//! - [`AdapterRegistry`] - Explicit endpoint-to-adapter routing
//! - [`MemoryAdapter`] - In-memory implementation for tests
//!
//! ## Design Notes
//!
//! Adapters own network policy: rate limiting, transient retry, nonce
//! sequencing. The engine never retries and never submits; it only reads
//! current state and collects the transactions adapters build.

pub mod error;
pub mod memory;
pub mod registry;
pub mod traits;

pub use error::AdapterError;
pub use memory::MemoryAdapter;
pub use registry::AdapterRegistry;
pub use traits::{
    CallerBpsCapAdapter, ChainAdapter, CurrentLibrary, EnforcedOptionParam, LibraryTimeout,
};
