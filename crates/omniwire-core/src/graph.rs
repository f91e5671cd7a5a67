//! The declarative pathway graph.
//!
//! A graph declares contracts (nodes) and directed pathways between them
//! (edges), each carrying the configuration the engine must reconcile. The
//! graph is built once per run from a static declaration and is read-only
//! during reconciliation; declaration order is stable and drives the order
//! of emitted transactions.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::executor::ExecutorConfig;
use crate::options::EnforcedOption;
use crate::types::{Address, OmniPoint};
use crate::uln::{UlnConfig, UlnUserConfig};

/// Node-level configuration for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// The delegate allowed to change endpoint config on behalf of the owner.
    #[serde(default)]
    pub delegate: Option<Address>,
    /// The contract owner.
    #[serde(default)]
    pub owner: Option<Address>,
    /// Basis-point cap for third-party callers, where supported.
    #[serde(default)]
    pub caller_bps_cap: Option<u64>,
}

/// A declared contract: a point plus optional node-level config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractNode {
    pub point: OmniPoint,
    #[serde(default)]
    pub config: Option<NodeConfig>,
}

/// Receive library plus the grace period for the library switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiveLibraryConfig {
    pub receive_library: Address,
    #[serde(default)]
    pub grace_period: u64,
}

/// Expiring fallback to an old receive library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiveLibraryTimeoutConfig {
    pub lib: Address,
    pub expiry: u64,
}

/// Send-side configuration: executor and/or ULN settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendConfig {
    #[serde(default)]
    pub executor_config: Option<ExecutorConfig>,
    #[serde(default)]
    pub uln_config: Option<UlnUserConfig>,
}

/// Receive-side configuration: ULN settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiveConfig {
    #[serde(default)]
    pub uln_config: Option<UlnUserConfig>,
}

/// Edge-level configuration for one pathway.
///
/// Every field is optional; an absent field means "do not manage this
/// domain for this pathway".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeConfig {
    #[serde(default)]
    pub enforced_options: Option<Vec<EnforcedOption>>,
    #[serde(default)]
    pub send_library: Option<Address>,
    #[serde(default)]
    pub receive_library_config: Option<ReceiveLibraryConfig>,
    #[serde(default)]
    pub receive_library_timeout_config: Option<ReceiveLibraryTimeoutConfig>,
    #[serde(default)]
    pub send_config: Option<SendConfig>,
    #[serde(default)]
    pub receive_config: Option<ReceiveConfig>,
}

/// A directed pathway from one contract to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    pub from: OmniPoint,
    pub to: OmniPoint,
    #[serde(default)]
    pub config: Option<EdgeConfig>,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// The full declarative graph: contracts and the pathways between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OmniGraph {
    pub contracts: Vec<ContractNode>,
    pub connections: Vec<Connection>,
}

impl OmniGraph {
    /// Validate the declaration before any chain reads happen.
    ///
    /// Checks that contracts are unique, that every connection endpoint
    /// references a declared contract, and that every declared ULN config
    /// passes the explicit-presence rules. Errors name the offending
    /// pathway; pathways without errors are unaffected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut declared = HashSet::new();
        for contract in &self.contracts {
            if !declared.insert(contract.point) {
                return Err(ConfigError::DuplicateContract {
                    point: contract.point.to_string(),
                });
            }
        }

        for connection in &self.connections {
            for endpoint in [&connection.from, &connection.to] {
                if !declared.contains(endpoint) {
                    return Err(ConfigError::UnknownContract {
                        pathway: connection.to_string(),
                        point: endpoint.to_string(),
                    });
                }
            }

            if let Some(config) = &connection.config {
                let pathway = connection.to_string();
                if let Some(uln) = config.send_config.as_ref().and_then(|c| c.uln_config.as_ref())
                {
                    UlnConfig::from_user(uln, &pathway)?;
                }
                if let Some(uln) =
                    config.receive_config.as_ref().and_then(|c| c.uln_config.as_ref())
                {
                    UlnConfig::from_user(uln, &pathway)?;
                }
            }
        }

        Ok(())
    }

    /// Look up the declared node config for a point, if any.
    pub fn node_config(&self, point: &OmniPoint) -> Option<&NodeConfig> {
        self.contracts
            .iter()
            .find(|c| c.point == *point)
            .and_then(|c| c.config.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Eid;

    fn point(eid: u32, byte: u8) -> OmniPoint {
        OmniPoint::new(Eid(eid), Address::from_bytes([byte; 32]))
    }

    fn graph_with(connections: Vec<Connection>) -> OmniGraph {
        OmniGraph {
            contracts: vec![
                ContractNode { point: point(1, 0xAA), config: None },
                ContractNode { point: point(2, 0xBB), config: None },
            ],
            connections,
        }
    }

    #[test]
    fn test_valid_graph() {
        let graph = graph_with(vec![Connection {
            from: point(1, 0xAA),
            to: point(2, 0xBB),
            config: None,
        }]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_unknown_contract_rejected() {
        let graph = graph_with(vec![Connection {
            from: point(1, 0xAA),
            to: point(3, 0xCC),
            config: None,
        }]);
        assert!(matches!(
            graph.validate().unwrap_err(),
            ConfigError::UnknownContract { .. }
        ));
    }

    #[test]
    fn test_duplicate_contract_rejected() {
        let mut graph = graph_with(vec![]);
        let duplicate = graph.contracts[0].clone();
        graph.contracts.push(duplicate);
        assert!(matches!(
            graph.validate().unwrap_err(),
            ConfigError::DuplicateContract { .. }
        ));
    }

    #[test]
    fn test_ambiguous_uln_config_names_pathway() {
        let graph = graph_with(vec![Connection {
            from: point(1, 0xAA),
            to: point(2, 0xBB),
            config: Some(EdgeConfig {
                send_config: Some(SendConfig {
                    uln_config: Some(UlnUserConfig {
                        confirmations: Some(5),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        }]);

        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("requiredDVNs must be specified"));
        assert!(err.to_string().contains("→"));
    }

    #[test]
    fn test_node_config_lookup() {
        let mut graph = graph_with(vec![]);
        graph.contracts[0].config = Some(NodeConfig {
            delegate: Some(Address::from_bytes([0xDD; 32])),
            ..Default::default()
        });

        assert!(graph.node_config(&point(1, 0xAA)).is_some());
        assert!(graph.node_config(&point(2, 0xBB)).is_none());
    }

    #[test]
    fn test_graph_json_declaration() {
        let json = r#"{
            "contracts": [
                { "point": { "eid": 1, "address": "0xaa" } },
                { "point": { "eid": 2, "address": "0xbb" } }
            ],
            "connections": [
                {
                    "from": { "eid": 1, "address": "0xaa" },
                    "to": { "eid": 2, "address": "0xbb" },
                    "config": {
                        "send_library": "0x1111",
                        "enforced_options": [
                            { "option_type": "lz_receive", "msg_type": 1, "gas": 200000, "value": 0 }
                        ]
                    }
                }
            ]
        }"#;

        let graph: OmniGraph = serde_json::from_str(json).unwrap();
        assert!(graph.validate().is_ok());
        let config = graph.connections[0].config.as_ref().unwrap();
        assert!(config.send_library.is_some());
        assert_eq!(config.enforced_options.as_ref().unwrap().len(), 1);
    }
}
