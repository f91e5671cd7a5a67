//! Test fixtures: canned addresses, graphs, and in-memory chain networks.

use std::collections::HashMap;
use std::sync::Arc;

use omniwire_adapter::{AdapterRegistry, ChainAdapter, MemoryAdapter};
use omniwire_core::{
    Address, Connection, ContractNode, EdgeConfig, Eid, OmniGraph, OmniPoint, Transaction,
    UlnUserConfig,
};

/// A repeated-byte address, the way most fixtures name things.
pub fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 32])
}

/// A point with a repeated-byte address.
pub fn point(eid: Eid, byte: u8) -> OmniPoint {
    OmniPoint::new(eid, addr(byte))
}

/// A fully explicit ULN declaration.
pub fn explicit_uln(
    confirmations: u64,
    required: Vec<Address>,
    optional: Vec<Address>,
    threshold: u8,
) -> UlnUserConfig {
    UlnUserConfig {
        confirmations: Some(confirmations),
        required_dvns: Some(required),
        optional_dvns: Some(optional),
        optional_dvn_threshold: Some(threshold),
    }
}

/// A ULN declaration that intentionally opts into all chain defaults.
pub fn default_uln() -> UlnUserConfig {
    explicit_uln(0, vec![], vec![], 0)
}

/// A two-contract graph with one pathway `eid_a -> eid_b` carrying the
/// given edge config. Contract addresses are `0xAA…` and `0xBB…`.
pub fn two_contract_graph(eid_a: Eid, eid_b: Eid, config: Option<EdgeConfig>) -> OmniGraph {
    OmniGraph {
        contracts: vec![
            ContractNode { point: point(eid_a, 0xAA), config: None },
            ContractNode { point: point(eid_b, 0xBB), config: None },
        ],
        connections: vec![Connection { from: point(eid_a, 0xAA), to: point(eid_b, 0xBB), config }],
    }
}

/// A set of in-memory chains plus the registry the engine reads through.
///
/// Keeps concrete [`MemoryAdapter`] handles so tests can seed state and
/// apply the transactions a run produced, closing the idempotence loop.
pub struct TestNet {
    registry: AdapterRegistry,
    chains: HashMap<Eid, Arc<MemoryAdapter>>,
}

impl TestNet {
    /// Chains with empty state for each eid.
    pub fn new(eids: &[Eid]) -> Self {
        Self::with_adapters(eids.iter().map(|&eid| MemoryAdapter::new(eid)).collect())
    }

    /// Chains from pre-configured adapters.
    pub fn with_adapters(adapters: Vec<MemoryAdapter>) -> Self {
        let mut registry = AdapterRegistry::new();
        let mut chains = HashMap::new();
        for adapter in adapters {
            let eid = adapter.eid();
            let adapter = Arc::new(adapter);
            registry.register(eid, adapter.clone() as Arc<dyn ChainAdapter>);
            chains.insert(eid, adapter);
        }
        Self { registry, chains }
    }

    /// The registry to hand to the engine.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// The concrete adapter for one chain.
    ///
    /// # Panics
    /// Panics if the eid has no chain in this net.
    pub fn chain(&self, eid: Eid) -> &Arc<MemoryAdapter> {
        self.chains
            .get(&eid)
            .unwrap_or_else(|| panic!("no chain for eid {eid} in fixture"))
    }

    /// Apply transactions back to their target chains.
    pub async fn apply_all(
        &self,
        transactions: &[Transaction],
    ) -> Result<(), omniwire_adapter::AdapterError> {
        for tx in transactions {
            self.chain(tx.target.eid).apply(tx).await?;
        }
        Ok(())
    }

    /// Run one reconcile-then-apply cycle and return the transactions that
    /// were applied. After this, a second `wire` run over the same graph
    /// must return nothing.
    ///
    /// # Panics
    /// Panics on wire or apply failure; fixtures are test tooling.
    pub async fn converge(&self, graph: &OmniGraph) -> Vec<Transaction> {
        let transactions = omniwire::wire(graph, &self.registry)
            .await
            .expect("wire failed");
        self.apply_all(&transactions).await.expect("apply failed");
        transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_contract_graph_validates() {
        let graph = two_contract_graph(Eid(1), Eid(2), None);
        assert!(graph.validate().is_ok());
    }

    #[tokio::test]
    async fn test_net_routes_by_eid() {
        let net = TestNet::new(&[Eid(1), Eid(2)]);
        assert_eq!(net.chain(Eid(1)).eid(), Eid(1));
        assert_eq!(net.chain(Eid(2)).eid(), Eid(2));
    }
}
