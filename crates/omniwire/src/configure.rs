//! Domain configurators.
//!
//! One configurator per configuration domain. Each reads current state
//! through the chain adapter for the local endpoint, normalizes both the
//! declared and the current value, diffs, and emits zero or one transaction
//! per pathway (enforced options batch per local contract). A domain left
//! undeclared on a pathway is skipped entirely.
//!
//! Reads for distinct pathways are independent and fan out concurrently;
//! futures are joined in declaration order so emitted transactions stay
//! deterministic.

use std::fmt;

use bytes::Bytes;
use futures::future;

use omniwire_adapter::{
    AdapterError, AdapterRegistry, ChainAdapter, CurrentLibrary, EnforcedOptionParam,
    LibraryTimeout,
};
use omniwire_core::{
    build_enforced_options, is_no_options, Address, ConfigType, Connection, ExecutorConfig,
    OmniGraph, OmniPoint, Transaction, UlnConfig, UlnUserConfig,
};

use crate::error::{Result, WireError};

/// Attach pathway and domain context to an adapter failure.
fn adapter_ctx(
    pathway: impl fmt::Display,
    domain: &'static str,
) -> impl FnOnce(AdapterError) -> WireError {
    let pathway = pathway.to_string();
    move |source| WireError::Adapter { pathway, domain, source }
}

/// Treat a "never configured" read as an absent value.
fn or_unset<T>(
    result: std::result::Result<Option<T>, AdapterError>,
) -> std::result::Result<Option<T>, AdapterError> {
    match result {
        Err(AdapterError::NotConfigured) => Ok(None),
        other => other,
    }
}

/// Treat a "never configured" read as empty bytes.
fn or_empty(
    result: std::result::Result<Bytes, AdapterError>,
) -> std::result::Result<Bytes, AdapterError> {
    match result {
        Err(AdapterError::NotConfigured) => Ok(Bytes::new()),
        other => other,
    }
}

/// Treat a "never configured" library read as the unset library.
fn or_unset_library(
    result: std::result::Result<CurrentLibrary, AdapterError>,
) -> std::result::Result<CurrentLibrary, AdapterError> {
    match result {
        Err(AdapterError::NotConfigured) => Ok(CurrentLibrary::unset()),
        other => other,
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Node-level domains
// ─────────────────────────────────────────────────────────────────────────

/// Set delegates on contracts that declare one.
pub async fn configure_delegates(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.contracts.iter().map(|contract| async move {
        let Some(delegate) = contract.config.as_ref().and_then(|c| c.delegate) else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&contract.point)
            .map_err(adapter_ctx(contract.point, "delegate"))?;
        let current = or_unset(adapter.get_delegate(&contract.point).await)
            .map_err(adapter_ctx(contract.point, "delegate"))?;
        if current == Some(delegate) {
            tracing::debug!(point = %contract.point, "delegate already set");
            return Ok(None);
        }
        let tx = adapter
            .set_delegate(&contract.point, delegate)
            .await
            .map_err(adapter_ctx(contract.point, "delegate"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Transfer ownership of contracts that declare an owner.
///
/// Runs last in the driver order: transferring ownership first would
/// invalidate the admin calls the other domains emit.
pub async fn configure_owners(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.contracts.iter().map(|contract| async move {
        let Some(owner) = contract.config.as_ref().and_then(|c| c.owner) else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&contract.point)
            .map_err(adapter_ctx(contract.point, "owner"))?;
        let current = or_unset(adapter.get_owner(&contract.point).await)
            .map_err(adapter_ctx(contract.point, "owner"))?;
        if current == Some(owner) {
            return Ok(None);
        }
        let tx = adapter
            .set_owner(&contract.point, owner)
            .await
            .map_err(adapter_ctx(contract.point, "owner"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Set caller bps caps where declared and where the chain family exposes
/// the capability. Capability absence is a silent skip, not an error.
pub async fn configure_caller_bps_caps(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.contracts.iter().map(|contract| async move {
        let Some(cap) = contract.config.as_ref().and_then(|c| c.caller_bps_cap) else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&contract.point)
            .map_err(adapter_ctx(contract.point, "caller bps cap"))?;
        let Some(capability) = adapter.caller_bps_cap() else {
            tracing::debug!(point = %contract.point, "caller bps cap not supported, skipping");
            return Ok(None);
        };
        let current = or_unset(capability.get_caller_bps_cap(&contract.point).await)
            .map_err(adapter_ctx(contract.point, "caller bps cap"))?;
        if current == Some(cap) {
            return Ok(None);
        }
        let tx = capability
            .set_caller_bps_cap(&contract.point, cap)
            .await
            .map_err(adapter_ctx(contract.point, "caller bps cap"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

// ─────────────────────────────────────────────────────────────────────────
// Edge-level domains
// ─────────────────────────────────────────────────────────────────────────

/// Register peers for every declared pathway.
pub async fn configure_peers(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "peer"))?;
        let current = or_unset(adapter.get_peer(&connection.from, connection.to.eid).await)
            .map_err(adapter_ctx(connection, "peer"))?;
        if current == Some(connection.to.address) {
            tracing::debug!(pathway = %connection, "peer already set");
            return Ok(None);
        }
        let tx = adapter
            .set_peer(&connection.from, connection.to.eid, connection.to.address)
            .await
            .map_err(adapter_ctx(connection, "peer"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Pin send libraries where declared.
///
/// A current value that merely falls back to the chain default is still
/// set explicitly, even when it equals the declared library; only an
/// app-pinned matching value is skipped.
pub async fn configure_send_libraries(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(library) = connection.config.as_ref().and_then(|c| c.send_library) else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "send library"))?;
        let current =
            or_unset_library(adapter.get_send_library(&connection.from, connection.to.eid).await)
                .map_err(adapter_ctx(connection, "send library"))?;
        if !current.is_default && current.address == Some(library) {
            tracing::debug!(pathway = %connection, "send library already set");
            return Ok(None);
        }
        let tx = adapter
            .set_send_library(&connection.from, connection.to.eid, library)
            .await
            .map_err(adapter_ctx(connection, "send library"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Pin receive libraries where declared, with the configured grace period.
pub async fn configure_receive_libraries(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(config) = connection.config.as_ref().and_then(|c| c.receive_library_config)
        else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "receive library"))?;
        let current = or_unset_library(
            adapter.get_receive_library(&connection.from, connection.to.eid).await,
        )
        .map_err(adapter_ctx(connection, "receive library"))?;
        if !current.is_default && current.address == Some(config.receive_library) {
            tracing::debug!(pathway = %connection, "receive library already set");
            return Ok(None);
        }
        let tx = adapter
            .set_receive_library(
                &connection.from,
                connection.to.eid,
                config.receive_library,
                config.grace_period,
            )
            .await
            .map_err(adapter_ctx(connection, "receive library"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Set receive-library timeouts where declared.
pub async fn configure_receive_library_timeouts(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(config) = connection
            .config
            .as_ref()
            .and_then(|c| c.receive_library_timeout_config)
        else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "receive library timeout"))?;
        let current = or_unset(
            adapter
                .get_receive_library_timeout(&connection.from, connection.to.eid)
                .await,
        )
        .map_err(adapter_ctx(connection, "receive library timeout"))?;
        let desired = LibraryTimeout { lib: config.lib, expiry: config.expiry };
        if current == Some(desired) {
            return Ok(None);
        }
        let tx = adapter
            .set_receive_library_timeout(
                &connection.from,
                connection.to.eid,
                config.lib,
                config.expiry,
            )
            .await
            .map_err(adapter_ctx(connection, "receive library timeout"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Reconcile send-side ULN configs through the resolved send library.
pub async fn configure_send_uln_configs(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(uln) = connection
            .config
            .as_ref()
            .and_then(|c| c.send_config.as_ref())
            .and_then(|c| c.uln_config.as_ref())
        else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "send ULN config"))?;
        let library = resolve_send_library(connection, adapter.as_ref()).await?;
        reconcile_uln(connection, adapter.as_ref(), library, ConfigType::SendUln, uln).await
    });
    collect(tasks).await
}

/// Reconcile receive-side ULN configs through the resolved receive library.
pub async fn configure_receive_uln_configs(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(uln) = connection
            .config
            .as_ref()
            .and_then(|c| c.receive_config.as_ref())
            .and_then(|c| c.uln_config.as_ref())
        else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "receive ULN config"))?;
        let library = resolve_receive_library(connection, adapter.as_ref()).await?;
        reconcile_uln(connection, adapter.as_ref(), library, ConfigType::RecvUln, uln).await
    });
    collect(tasks).await
}

/// Reconcile executor configs through the resolved send library.
pub async fn configure_executor_configs(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    let tasks = graph.connections.iter().map(|connection| async move {
        let Some(executor_config) = connection
            .config
            .as_ref()
            .and_then(|c| c.send_config.as_ref())
            .and_then(|c| c.executor_config)
        else {
            return Ok(None);
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "executor config"))?;
        let library = resolve_send_library(connection, adapter.as_ref()).await?;

        let desired_bytes = executor_config.canonical_bytes();
        let current = or_unset(
            adapter
                .get_config(&connection.from, library, connection.to.eid, ConfigType::Executor)
                .await,
        )
        .map_err(adapter_ctx(connection, "executor config"))?;
        let current_bytes = match current.filter(|bytes| !bytes.is_empty()) {
            Some(bytes) => Some(
                ExecutorConfig::from_bytes(&bytes)
                    .map_err(|source| WireError::Codec {
                        pathway: connection.to_string(),
                        source,
                    })?
                    .canonical_bytes(),
            ),
            None => None,
        };
        if current_bytes.as_deref() == Some(desired_bytes.as_slice()) {
            tracing::debug!(pathway = %connection, "executor config already set");
            return Ok(None);
        }
        let tx = adapter
            .set_config(
                &connection.from,
                library,
                connection.to.eid,
                ConfigType::Executor,
                desired_bytes.into(),
            )
            .await
            .map_err(adapter_ctx(connection, "executor config"))?;
        Ok(Some(tx))
    });
    collect(tasks).await
}

/// Reconcile enforced options, batching all dirty `(remote, msg_type)`
/// blobs for one local contract into a single setter call.
pub async fn configure_enforced_options(
    graph: &OmniGraph,
    adapters: &AdapterRegistry,
) -> Result<Vec<Transaction>> {
    // Local contract -> dirty blobs, in declaration order.
    let mut by_oapp: Vec<(OmniPoint, Vec<EnforcedOptionParam>)> = Vec::new();

    for connection in &graph.connections {
        let Some(declarations) =
            connection.config.as_ref().and_then(|c| c.enforced_options.as_ref())
        else {
            continue;
        };
        let adapter = adapters
            .adapter_for(&connection.from)
            .map_err(adapter_ctx(connection, "enforced options"))?;

        for (msg_type, options) in build_enforced_options(declarations) {
            let desired = options.encode();
            let current = or_empty(
                adapter
                    .get_enforced_options(&connection.from, connection.to.eid, msg_type)
                    .await,
            )
            .map_err(adapter_ctx(connection, "enforced options"))?;
            // 0x00 empty documents and empty bytes both mean "no options".
            let current_normalized: &[u8] = if is_no_options(&current) { &[] } else { &current };
            if current_normalized == desired.as_slice() {
                tracing::debug!(pathway = %connection, msg_type, "enforced options already set");
                continue;
            }

            let entry = match by_oapp.iter().position(|(oapp, _)| *oapp == connection.from) {
                Some(index) => index,
                None => {
                    by_oapp.push((connection.from, Vec::new()));
                    by_oapp.len() - 1
                }
            };
            by_oapp[entry].1.push(EnforcedOptionParam {
                eid: connection.to.eid,
                msg_type,
                options: desired,
            });
        }
    }

    let mut transactions = Vec::with_capacity(by_oapp.len());
    for (oapp, params) in by_oapp {
        let adapter = adapters
            .adapter_for(&oapp)
            .map_err(adapter_ctx(oapp, "enforced options"))?;
        let tx = adapter
            .set_enforced_options(&oapp, params)
            .await
            .map_err(adapter_ctx(oapp, "enforced options"))?;
        transactions.push(tx);
    }
    Ok(transactions)
}

// ─────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────

/// Diff one declared ULN config against the bytes stored under `library`.
async fn reconcile_uln(
    connection: &Connection,
    adapter: &dyn ChainAdapter,
    library: Address,
    config_type: ConfigType,
    uln: &UlnUserConfig,
) -> Result<Option<Transaction>> {
    let domain = match config_type {
        ConfigType::SendUln => "send ULN config",
        _ => "receive ULN config",
    };
    let pathway = connection.to_string();
    let desired = UlnConfig::from_user(uln, &pathway)?;
    let desired_bytes = desired.canonical_bytes();

    let current = or_unset(
        adapter
            .get_config(&connection.from, library, connection.to.eid, config_type)
            .await,
    )
    .map_err(adapter_ctx(connection, domain))?;

    // Re-serialize the current config so both sides are compared in the
    // same canonical byte form.
    let current_bytes = match current.filter(|bytes| !bytes.is_empty()) {
        Some(bytes) => Some(
            UlnConfig::from_bytes(&bytes)
                .map_err(|source| WireError::Codec { pathway: pathway.clone(), source })?
                .canonical_bytes(),
        ),
        None => None,
    };

    if current_bytes.as_deref() == Some(desired_bytes.as_slice()) {
        tracing::debug!(pathway = %connection, domain, "ULN config already set");
        return Ok(None);
    }

    let tx = adapter
        .set_config(
            &connection.from,
            library,
            connection.to.eid,
            config_type,
            desired_bytes.into(),
        )
        .await
        .map_err(adapter_ctx(connection, domain))?;
    Ok(Some(tx))
}

/// The library ULN/executor config writes go through on the send side:
/// the declared send library, else the chain's current resolution.
async fn resolve_send_library(
    connection: &Connection,
    adapter: &dyn ChainAdapter,
) -> Result<Address> {
    if let Some(library) = connection.config.as_ref().and_then(|c| c.send_library) {
        return Ok(library);
    }
    let current =
        or_unset_library(adapter.get_send_library(&connection.from, connection.to.eid).await)
            .map_err(adapter_ctx(connection, "send library"))?;
    current.address.ok_or_else(|| WireError::MissingLibrary {
        pathway: connection.to_string(),
        domain: "send",
    })
}

/// The library receive-side ULN config writes go through: the declared
/// receive library, else the chain's current resolution.
async fn resolve_receive_library(
    connection: &Connection,
    adapter: &dyn ChainAdapter,
) -> Result<Address> {
    if let Some(config) = connection.config.as_ref().and_then(|c| c.receive_library_config) {
        return Ok(config.receive_library);
    }
    let current =
        or_unset_library(adapter.get_receive_library(&connection.from, connection.to.eid).await)
            .map_err(adapter_ctx(connection, "receive library"))?;
    current.address.ok_or_else(|| WireError::MissingLibrary {
        pathway: connection.to_string(),
        domain: "receive",
    })
}

/// Join per-pathway futures in declaration order and drop the skips.
async fn collect<F>(tasks: impl Iterator<Item = F>) -> Result<Vec<Transaction>>
where
    F: std::future::Future<Output = Result<Option<Transaction>>>,
{
    let results = future::try_join_all(tasks).await?;
    Ok(results.into_iter().flatten().collect())
}
