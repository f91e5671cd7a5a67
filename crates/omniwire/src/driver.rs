//! The reconciliation driver.
//!
//! One run: validate the graph, invoke every domain configurator in a fixed
//! order over the declared connections and contracts, concatenate the
//! non-empty results, and return the ordered transaction list.
//!
//! The fixed domain order matters operationally (libraries must be pinned
//! before ULN configs referencing them are meaningful, ownership transfers
//! go last), but the driver only sequences; causal enforcement and retry
//! belong to the external broadcaster.

use omniwire_adapter::AdapterRegistry;
use omniwire_core::{OmniGraph, Transaction};

use crate::configure::{
    configure_caller_bps_caps, configure_delegates, configure_enforced_options,
    configure_executor_configs, configure_owners, configure_peers, configure_receive_libraries,
    configure_receive_library_timeouts, configure_receive_uln_configs, configure_send_libraries,
    configure_send_uln_configs,
};
use crate::error::Result;

/// Reconcile a graph against live chain state.
///
/// Returns the ordered transactions needed to bring the chains into
/// agreement with the declaration. Produces no side effects: applying the
/// transactions is the caller's signer/broadcaster's job. A run against
/// already-satisfied state returns an empty list.
pub async fn wire(graph: &OmniGraph, adapters: &AdapterRegistry) -> Result<Vec<Transaction>> {
    graph.validate()?;

    tracing::info!(
        contracts = graph.contracts.len(),
        connections = graph.connections.len(),
        "checking pathway configuration"
    );

    let mut transactions = Vec::new();
    transactions.extend(configure_peers(graph, adapters).await?);
    transactions.extend(configure_delegates(graph, adapters).await?);
    transactions.extend(configure_enforced_options(graph, adapters).await?);
    transactions.extend(configure_send_libraries(graph, adapters).await?);
    transactions.extend(configure_receive_libraries(graph, adapters).await?);
    transactions.extend(configure_receive_library_timeouts(graph, adapters).await?);
    transactions.extend(configure_send_uln_configs(graph, adapters).await?);
    transactions.extend(configure_executor_configs(graph, adapters).await?);
    transactions.extend(configure_receive_uln_configs(graph, adapters).await?);
    transactions.extend(configure_caller_bps_caps(graph, adapters).await?);
    transactions.extend(configure_owners(graph, adapters).await?);

    tracing::info!(count = transactions.len(), "pathway configuration checked");
    Ok(transactions)
}
