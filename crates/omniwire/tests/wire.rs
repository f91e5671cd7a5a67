//! End-to-end reconciliation tests against in-memory chains.
//!
//! The central property: wiring a graph, applying every returned
//! transaction, then wiring again yields an empty list.

use std::collections::HashMap;
use std::sync::Arc;

use omniwire::{
    wire, AdapterRegistry, Address, ChainAdapter, Connection, ContractNode, EdgeConfig, Eid,
    EnforcedOption, ExecutorConfig, MemoryAdapter, NodeConfig, OmniGraph, OmniPoint,
    ReceiveConfig, ReceiveLibraryConfig, ReceiveLibraryTimeoutConfig, SendConfig, Transaction,
    UlnUserConfig, WireError,
};

const EID_A: Eid = Eid(30101);
const EID_B: Eid = Eid(30102);

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 32])
}

fn point(eid: Eid, byte: u8) -> OmniPoint {
    OmniPoint::new(eid, addr(byte))
}

/// Two in-memory chains plus the registry the engine sees.
struct TestNet {
    registry: AdapterRegistry,
    chains: HashMap<Eid, Arc<MemoryAdapter>>,
}

impl TestNet {
    fn new(adapters: Vec<MemoryAdapter>) -> Self {
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

    fn two_chains() -> Self {
        Self::new(vec![MemoryAdapter::new(EID_A), MemoryAdapter::new(EID_B)])
    }

    fn chain(&self, eid: Eid) -> &Arc<MemoryAdapter> {
        &self.chains[&eid]
    }

    async fn apply_all(&self, transactions: &[Transaction]) {
        for tx in transactions {
            self.chain(tx.target.eid).apply(tx).await.unwrap();
        }
    }
}

fn two_contract_graph(config: Option<EdgeConfig>) -> OmniGraph {
    OmniGraph {
        contracts: vec![
            ContractNode { point: point(EID_A, 0xAA), config: None },
            ContractNode { point: point(EID_B, 0xBB), config: None },
        ],
        connections: vec![Connection {
            from: point(EID_A, 0xAA),
            to: point(EID_B, 0xBB),
            config,
        }],
    }
}

fn uln_defaults() -> UlnUserConfig {
    UlnUserConfig {
        confirmations: Some(0),
        required_dvns: Some(vec![]),
        optional_dvns: Some(vec![]),
        optional_dvn_threshold: Some(0),
    }
}

#[tokio::test]
async fn test_empty_graph_emits_nothing() {
    let net = TestNet::two_chains();
    let graph = OmniGraph::default();
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_peers_wired_then_idempotent() {
    let net = TestNet::two_chains();
    let mut graph = two_contract_graph(None);
    graph.connections.push(Connection {
        from: point(EID_B, 0xBB),
        to: point(EID_A, 0xAA),
        config: None,
    });

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert!(transactions[0].description.contains("peer"));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delegate_configured_once() {
    let net = TestNet::two_chains();
    let mut graph = two_contract_graph(None);
    graph.contracts[0].config = Some(NodeConfig {
        delegate: Some(addr(0xDD)),
        ..Default::default()
    });

    let transactions = wire(&graph, &net.registry).await.unwrap();
    // One peer tx for the connection, one delegate tx for the node.
    assert_eq!(transactions.len(), 2);

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_library_scenario() {
    let net = TestNet::two_chains();
    let declared = addr(0xAB);
    net.chain(EID_A)
        .set_default_libraries(EID_B, addr(0x01), addr(0x02))
        .await;

    let graph = two_contract_graph(Some(EdgeConfig {
        send_library: Some(declared),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    let library_txs: Vec<_> = transactions
        .iter()
        .filter(|tx| tx.description.contains("send library"))
        .collect();
    assert_eq!(library_txs.len(), 1);

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_default_library_is_pinned_even_when_equal() {
    let net = TestNet::two_chains();
    let library = addr(0xAB);
    // The chain default already resolves to the declared library, but a
    // default fallback is not an explicit setting.
    net.chain(EID_A).set_default_libraries(EID_B, library, library).await;

    let graph = two_contract_graph(Some(EdgeConfig {
        send_library: Some(library),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("send library")));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_receive_library_and_timeout() {
    let net = TestNet::two_chains();
    let graph = two_contract_graph(Some(EdgeConfig {
        receive_library_config: Some(ReceiveLibraryConfig {
            receive_library: addr(0xCD),
            grace_period: 10,
        }),
        receive_library_timeout_config: Some(ReceiveLibraryTimeoutConfig {
            lib: addr(0xCE),
            expiry: 500,
        }),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("receive library")));
    assert!(transactions.iter().any(|tx| tx.description.contains("timeout")));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uln_config_idempotent_and_order_insensitive() {
    let net = TestNet::two_chains();
    net.chain(EID_A)
        .set_default_libraries(EID_B, addr(0x01), addr(0x02))
        .await;

    let forward = UlnUserConfig {
        confirmations: Some(12),
        required_dvns: Some(vec![addr(0x11), addr(0x33)]),
        optional_dvns: Some(vec![addr(0x22), addr(0x44)]),
        optional_dvn_threshold: Some(1),
    };
    let graph = two_contract_graph(Some(EdgeConfig {
        send_config: Some(SendConfig {
            uln_config: Some(forward),
            ..Default::default()
        }),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("send ULN")));
    net.apply_all(&transactions).await;

    // Same declaration with the DVN arrays reordered must diff as equal.
    let reversed = UlnUserConfig {
        confirmations: Some(12),
        required_dvns: Some(vec![addr(0x33), addr(0x11)]),
        optional_dvns: Some(vec![addr(0x44), addr(0x22)]),
        optional_dvn_threshold: Some(1),
    };
    let reordered_graph = two_contract_graph(Some(EdgeConfig {
        send_config: Some(SendConfig {
            uln_config: Some(reversed),
            ..Default::default()
        }),
        ..Default::default()
    }));

    assert!(wire(&reordered_graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_receive_uln_config_uses_declared_receive_library() {
    let net = TestNet::two_chains();
    let graph = two_contract_graph(Some(EdgeConfig {
        receive_library_config: Some(ReceiveLibraryConfig {
            receive_library: addr(0xCD),
            grace_period: 0,
        }),
        receive_config: Some(ReceiveConfig { uln_config: Some(uln_defaults()) }),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("receive ULN")));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uln_config_without_any_library_fails_with_context() {
    let net = TestNet::two_chains();
    // No declared send library, no chain default seeded.
    let graph = two_contract_graph(Some(EdgeConfig {
        send_config: Some(SendConfig {
            uln_config: Some(uln_defaults()),
            ..Default::default()
        }),
        ..Default::default()
    }));

    let err = wire(&graph, &net.registry).await.unwrap_err();
    assert!(matches!(err, WireError::MissingLibrary { .. }));
    assert!(err.to_string().contains("30101"));
}

#[tokio::test]
async fn test_executor_config_idempotent() {
    let net = TestNet::two_chains();
    net.chain(EID_A)
        .set_default_libraries(EID_B, addr(0x01), addr(0x02))
        .await;

    let graph = two_contract_graph(Some(EdgeConfig {
        send_config: Some(SendConfig {
            executor_config: Some(ExecutorConfig {
                max_message_size: 10_000,
                executor: addr(0xEE),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("executor")));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enforced_options_batched_per_contract() {
    let net = TestNet::two_chains();
    let graph = two_contract_graph(Some(EdgeConfig {
        enforced_options: Some(vec![
            EnforcedOption::LzReceive { msg_type: 1, gas: 200_000, value: 0 },
            EnforcedOption::LzReceive { msg_type: 1, gas: 500_000, value: 1 },
            EnforcedOption::Compose { msg_type: 2, index: 0, gas: 100_000, value: 0 },
        ]),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    let option_txs: Vec<_> = transactions
        .iter()
        .filter(|tx| tx.description.contains("enforced options"))
        .collect();
    // Both msg types batch into one call on the local contract.
    assert_eq!(option_txs.len(), 1);
    assert!(option_txs[0].description.contains("2 msg type(s)"));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enforced_options_empty_document_still_diffs() {
    let net = TestNet::two_chains();
    // The chain reports the 0x00 empty document rather than empty bytes.
    net.chain(EID_A)
        .seed_enforced_options(addr(0xAA), EID_B, 1, vec![0x00])
        .await;

    let graph = two_contract_graph(Some(EdgeConfig {
        enforced_options: Some(vec![EnforcedOption::OrderedExecution { msg_type: 1 }]),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.iter().any(|tx| tx.description.contains("enforced options")));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_caller_bps_cap_capability() {
    let supported = TestNet::two_chains();
    let mut graph = two_contract_graph(None);
    graph.connections.clear();
    graph.contracts[0].config = Some(NodeConfig {
        caller_bps_cap: Some(100),
        ..Default::default()
    });

    let transactions = wire(&graph, &supported.registry).await.unwrap();
    assert_eq!(transactions.len(), 1);
    supported.apply_all(&transactions).await;
    assert!(wire(&graph, &supported.registry).await.unwrap().is_empty());

    // A chain without the capability skips the domain silently.
    let unsupported = TestNet::new(vec![
        MemoryAdapter::new(EID_A).without_caller_bps_cap(),
        MemoryAdapter::new(EID_B),
    ]);
    assert!(wire(&graph, &unsupported.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_transfer_emitted_last() {
    let net = TestNet::two_chains();
    let mut graph = two_contract_graph(None);
    graph.contracts[0].config = Some(NodeConfig {
        owner: Some(addr(0x0F)),
        delegate: Some(addr(0xDD)),
        ..Default::default()
    });

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert!(transactions.last().unwrap().description.contains("ownership"));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ambiguous_uln_declaration_fails_before_any_reads() {
    let net = TestNet::two_chains();
    let graph = two_contract_graph(Some(EdgeConfig {
        send_config: Some(SendConfig {
            uln_config: Some(UlnUserConfig {
                confirmations: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }));

    let err = wire(&graph, &net.registry).await.unwrap_err();
    assert!(matches!(err, WireError::Config(_)));
    assert!(err.to_string().contains("requiredDVNs must be specified"));
}

#[tokio::test]
async fn test_rpc_failure_carries_pathway_and_domain() {
    let net = TestNet::two_chains();
    net.chain(EID_A).poison("backend down").await;
    let graph = two_contract_graph(None);

    let err = wire(&graph, &net.registry).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("peer"));
    assert!(message.contains("30101"));
    assert!(matches!(err, WireError::Adapter { .. }));
}

#[tokio::test]
async fn test_strict_read_backends_treated_as_unconfigured() {
    // Backends whose getters revert for never-configured domains must
    // still diff correctly against an un-configured pathway.
    let net = TestNet::new(vec![
        MemoryAdapter::new(EID_A).with_strict_reads(),
        MemoryAdapter::new(EID_B).with_strict_reads(),
    ]);
    let graph = two_contract_graph(Some(EdgeConfig {
        receive_library_config: Some(ReceiveLibraryConfig {
            receive_library: addr(0xCD),
            grace_period: 0,
        }),
        ..Default::default()
    }));

    let transactions = wire(&graph, &net.registry).await.unwrap();
    assert_eq!(transactions.len(), 2); // peer + receive library

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_domain_order_is_fixed() {
    let net = TestNet::two_chains();
    net.chain(EID_A)
        .set_default_libraries(EID_B, addr(0x01), addr(0x02))
        .await;

    let mut graph = two_contract_graph(Some(EdgeConfig {
        enforced_options: Some(vec![EnforcedOption::LzReceive {
            msg_type: 1,
            gas: 200_000,
            value: 0,
        }]),
        send_library: Some(addr(0xAB)),
        receive_library_config: Some(ReceiveLibraryConfig {
            receive_library: addr(0xCD),
            grace_period: 0,
        }),
        receive_library_timeout_config: None,
        send_config: Some(SendConfig {
            executor_config: Some(ExecutorConfig {
                max_message_size: 1_000,
                executor: addr(0xEE),
            }),
            uln_config: Some(uln_defaults()),
        }),
        receive_config: Some(ReceiveConfig { uln_config: Some(uln_defaults()) }),
    }));
    graph.contracts[0].config = Some(NodeConfig {
        delegate: Some(addr(0xDD)),
        owner: Some(addr(0x0F)),
        caller_bps_cap: Some(50),
    });

    let transactions = wire(&graph, &net.registry).await.unwrap();
    let order: Vec<&str> = transactions
        .iter()
        .map(|tx| tx.description.as_str())
        .collect();

    let position = |needle: &str| {
        order
            .iter()
            .position(|description| description.contains(needle))
            .unwrap_or_else(|| panic!("missing transaction: {needle}"))
    };

    assert!(position("peer") < position("delegate"));
    assert!(position("delegate") < position("enforced options"));
    assert!(position("enforced options") < position("send library"));
    assert!(position("send library") < position("receive library"));
    assert!(position("send ULN") < position("executor"));
    assert!(position("executor") < position("receive ULN"));
    assert!(position("receive ULN") < position("caller bps cap"));
    assert!(position("caller bps cap") < position("ownership"));

    net.apply_all(&transactions).await;
    assert!(wire(&graph, &net.registry).await.unwrap().is_empty());
}
