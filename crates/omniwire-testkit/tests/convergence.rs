//! Fixture-driven convergence checks: any declared graph reaches a fixed
//! point after one reconcile-apply cycle.

use omniwire_core::{EdgeConfig, Eid, EnforcedOption, SendConfig};
use omniwire_testkit::fixtures::{addr, explicit_uln, two_contract_graph, TestNet};

const EID_A: Eid = Eid(30101);
const EID_B: Eid = Eid(30102);

#[tokio::test]
async fn test_bare_pathway_converges() {
    let net = TestNet::new(&[EID_A, EID_B]);
    let graph = two_contract_graph(EID_A, EID_B, None);

    let applied = net.converge(&graph).await;
    assert_eq!(applied.len(), 1); // the peer registration

    assert!(omniwire::wire(&graph, net.registry()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_configured_pathway_converges() {
    let net = TestNet::new(&[EID_A, EID_B]);
    net.chain(EID_A)
        .set_default_libraries(EID_B, addr(0x01), addr(0x02))
        .await;

    let graph = two_contract_graph(
        EID_A,
        EID_B,
        Some(EdgeConfig {
            send_library: Some(addr(0xAB)),
            enforced_options: Some(vec![EnforcedOption::LzReceive {
                msg_type: 1,
                gas: 250_000,
                value: 0,
            }]),
            send_config: Some(SendConfig {
                uln_config: Some(explicit_uln(15, vec![addr(0x11)], vec![], 0)),
                ..Default::default()
            }),
            ..Default::default()
        }),
    );

    let applied = net.converge(&graph).await;
    assert!(applied.len() >= 4); // peer, enforced options, send library, ULN

    assert!(omniwire::wire(&graph, net.registry()).await.unwrap().is_empty());
}
