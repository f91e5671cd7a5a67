//! # omniwire Testkit
//!
//! Testing utilities for omniwire.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: pinned byte encodings for the options and config
//!   codecs, guarding against format drift
//! - **Generators**: proptest strategies for property-based testing
//! - **Fixtures**: canned graphs and in-memory chain networks
//!
//! ## Fixtures
//!
//! ```rust,ignore
//! use omniwire_testkit::fixtures::{two_contract_graph, TestNet};
//! use omniwire_core::Eid;
//!
//! let net = TestNet::new(&[Eid(30101), Eid(30102)]);
//! let graph = two_contract_graph(Eid(30101), Eid(30102), None);
//! let transactions = omniwire::wire(&graph, net.registry()).await?;
//! net.apply_all(&transactions).await?;
//! assert!(omniwire::wire(&graph, net.registry()).await?.is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{addr, default_uln, explicit_uln, point, two_contract_graph, TestNet};
