//! Adapter registry: explicit endpoint-to-adapter routing.
//!
//! The registry is plain constructed state passed into the driver; there
//! are no ambient network-name mappings or environment-derived globals.

use std::collections::HashMap;
use std::sync::Arc;

use omniwire_core::{Eid, OmniPoint};

use crate::error::{AdapterError, Result};
use crate::traits::ChainAdapter;

/// Maps endpoints to the adapter that serves them.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<Eid, Arc<dyn ChainAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for an endpoint. Replaces any previous entry.
    pub fn register(&mut self, eid: Eid, adapter: Arc<dyn ChainAdapter>) -> &mut Self {
        self.adapters.insert(eid, adapter);
        self
    }

    /// Resolve the adapter serving a point's endpoint.
    pub fn adapter_for(&self, point: &OmniPoint) -> Result<&Arc<dyn ChainAdapter>> {
        self.adapters
            .get(&point.eid)
            .ok_or(AdapterError::NoAdapter(point.eid))
    }

    /// The endpoints with a registered adapter.
    pub fn eids(&self) -> impl Iterator<Item = Eid> + '_ {
        self.adapters.keys().copied()
    }
}
