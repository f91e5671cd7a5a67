//! Executor configuration: message size cap and executor address for the
//! send side of a pathway.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::Address;

/// Executor configuration for a send library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Maximum message size the executor accepts, in bytes.
    pub max_message_size: u32,
    /// The executor contract address.
    pub executor: Address,
}

impl ExecutorConfig {
    /// Serialize to the canonical byte layout: `max_message_size u32 LE`
    /// followed by the executor address as 32 bytes.
    ///
    /// There is nothing to sort here, so the encoding doubles as the
    /// canonical form for diffing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(36);
        buf.put_u32_le(self.max_message_size);
        buf.put_slice(self.executor.as_bytes());
        buf
    }

    /// Decode the exact inverse of [`canonical_bytes`](Self::canonical_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut buf = bytes;
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated {
                offset: 0,
                needed: 4 - buf.remaining(),
            });
        }
        let max_message_size = buf.get_u32_le();
        if buf.remaining() < 32 {
            return Err(CodecError::Truncated {
                offset: bytes.len() - buf.remaining(),
                needed: 32 - buf.remaining(),
            });
        }
        let mut arr = [0u8; 32];
        buf.copy_to_slice(&mut arr);
        if !buf.is_empty() {
            return Err(CodecError::TrailingBytes(buf.len()));
        }
        Ok(Self {
            max_message_size,
            executor: Address(arr),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let config = ExecutorConfig {
            max_message_size: 10_000,
            executor: Address::from_bytes([0xEE; 32]),
        };
        let bytes = config.canonical_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(ExecutorConfig::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_truncated() {
        let config = ExecutorConfig {
            max_message_size: 1,
            executor: Address::ZERO,
        };
        let bytes = config.canonical_bytes();
        assert!(matches!(
            ExecutorConfig::from_bytes(&bytes[..10]).unwrap_err(),
            CodecError::Truncated { .. }
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let config = ExecutorConfig {
            max_message_size: 1,
            executor: Address::ZERO,
        };
        let mut bytes = config.canonical_bytes();
        bytes.push(0);
        assert!(matches!(
            ExecutorConfig::from_bytes(&bytes).unwrap_err(),
            CodecError::TrailingBytes(1)
        ));
    }
}
