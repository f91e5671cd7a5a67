//! Executor options codec.
//!
//! Enforced options are execution hints (gas, native drops, compose calls,
//! ordered delivery) that a local contract mandates for messages of a given
//! type arriving from a given remote. On the wire they are a sequence of
//! tagged segments:
//!
//! ```text
//! [worker_id: u8][segment_len: u16 BE][option_type: u8][payload]
//! ```
//!
//! where `segment_len` covers the option type byte plus the payload. All
//! multi-byte payload integers are big-endian and fixed-width.
//!
//! Declarations are merged per `(remote, msg_type)` before encoding:
//! repeated `LzReceive` declarations sum their gas and value, repeated
//! `Compose` declarations sum per index, `NativeDrop` declarations stay
//! independent, and `OrderedExecution` is an idempotent flag.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::Address;

/// Serde helper for `u128` fields inside internally-tagged enums.
///
/// Serde buffers internally-tagged enum variants through its private
/// `Content` type, whose deserializer does not forward `deserialize_u128`
/// and fails with "u128 is not supported". Routing through
/// `deserialize_any` reads the buffered integer and widens it, while
/// serializing as a plain number keeps the JSON representation unchanged.
mod u128_num {
    use serde::{de::Visitor, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct U128Visitor;

        impl Visitor<'_> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer")
            }

            fn visit_u64<E>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_u128<E>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("u128 field cannot be negative"))
            }

            fn visit_i128<E: serde::de::Error>(self, v: i128) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("u128 field cannot be negative"))
            }
        }

        deserializer.deserialize_any(U128Visitor)
    }
}

/// Worker id tag for executor options segments.
pub const EXECUTOR_WORKER_ID: u8 = 1;

/// The executor option types carried in segment tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExecutorOptionType {
    /// Gas and msg.value for the receive-side `lzReceive` call.
    LzReceive = 1,
    /// Native token airdropped to a receiver on the destination chain.
    NativeDrop = 2,
    /// Gas and msg.value for a compose call at a given index.
    Compose = 3,
    /// Ordered (non-concurrent) execution flag.
    OrderedExecution = 4,
}

impl ExecutorOptionType {
    /// Convert to the wire tag.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from the wire tag.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::LzReceive),
            2 => Some(Self::NativeDrop),
            3 => Some(Self::Compose),
            4 => Some(Self::OrderedExecution),
            _ => None,
        }
    }
}

/// A single enforced-option declaration from the pathway graph.
///
/// Multiple declarations may share a `msg_type` (or `(msg_type, index)` for
/// compose); they are merged per the combination rules before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "option_type", rename_all = "snake_case", deny_unknown_fields)]
pub enum EnforcedOption {
    LzReceive {
        msg_type: u16,
        #[serde(with = "u128_num")]
        gas: u128,
        #[serde(with = "u128_num")]
        value: u128,
    },
    NativeDrop {
        msg_type: u16,
        #[serde(with = "u128_num")]
        amount: u128,
        receiver: Address,
    },
    Compose {
        msg_type: u16,
        index: u16,
        #[serde(with = "u128_num")]
        gas: u128,
        #[serde(with = "u128_num")]
        value: u128,
    },
    OrderedExecution {
        msg_type: u16,
    },
}

impl EnforcedOption {
    /// The application message type this declaration applies to.
    pub fn msg_type(&self) -> u16 {
        match self {
            Self::LzReceive { msg_type, .. }
            | Self::NativeDrop { msg_type, .. }
            | Self::Compose { msg_type, .. }
            | Self::OrderedExecution { msg_type } => *msg_type,
        }
    }
}

/// An accumulating builder for one options blob.
///
/// Mirrors the merge semantics of the wire format: adding the same option
/// type again combines rather than replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    lz_receive: Option<(u128, u128)>,
    native_drops: Vec<(u128, Address)>,
    compose: BTreeMap<u16, (u128, u128)>,
    ordered: bool,
}

impl Options {
    /// A builder with no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (accumulate) gas and value for the `lzReceive` call.
    pub fn add_lz_receive(&mut self, gas: u128, value: u128) -> &mut Self {
        let (current_gas, current_value) = self.lz_receive.unwrap_or((0, 0));
        self.lz_receive = Some((
            current_gas.saturating_add(gas),
            current_value.saturating_add(value),
        ));
        self
    }

    /// Add an independent native drop segment.
    pub fn add_native_drop(&mut self, amount: u128, receiver: Address) -> &mut Self {
        self.native_drops.push((amount, receiver));
        self
    }

    /// Add (accumulate) gas and value for the compose call at `index`.
    pub fn add_compose(&mut self, index: u16, gas: u128, value: u128) -> &mut Self {
        let entry = self.compose.entry(index).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(gas);
        entry.1 = entry.1.saturating_add(value);
        self
    }

    /// Request ordered execution. Idempotent.
    pub fn add_ordered_execution(&mut self) -> &mut Self {
        self.ordered = true;
        self
    }

    /// Fold one declaration into the builder.
    pub fn add_declaration(&mut self, decl: &EnforcedOption) -> &mut Self {
        match *decl {
            EnforcedOption::LzReceive { gas, value, .. } => self.add_lz_receive(gas, value),
            EnforcedOption::NativeDrop { amount, receiver, .. } => {
                self.add_native_drop(amount, receiver)
            }
            EnforcedOption::Compose { index, gas, value, .. } => {
                self.add_compose(index, gas, value)
            }
            EnforcedOption::OrderedExecution { .. } => self.add_ordered_execution(),
        }
    }

    /// True when no option of any type has been added.
    pub fn is_empty(&self) -> bool {
        self.lz_receive.is_none()
            && self.native_drops.is_empty()
            && self.compose.is_empty()
            && !self.ordered
    }

    /// The accumulated `lzReceive` gas and value, zero when absent.
    pub fn lz_receive(&self) -> (u128, u128) {
        self.lz_receive.unwrap_or((0, 0))
    }

    /// The native drop segments in declaration order.
    pub fn native_drops(&self) -> &[(u128, Address)] {
        &self.native_drops
    }

    /// The compose segments as `(index, gas, value)`, ordered by index.
    pub fn compose_options(&self) -> Vec<(u16, u128, u128)> {
        self.compose
            .iter()
            .map(|(&index, &(gas, value))| (index, gas, value))
            .collect()
    }

    /// Whether ordered execution was requested.
    pub fn ordered_execution(&self) -> bool {
        self.ordered
    }

    /// Encode to the wire format.
    ///
    /// Segment order is deterministic: lzReceive, native drops in
    /// declaration order, compose ascending by index, ordered-execution
    /// last. An empty builder encodes to empty bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some((gas, value)) = self.lz_receive {
            let mut payload = Vec::with_capacity(32);
            payload.put_u128(gas);
            payload.put_u128(value);
            put_segment(&mut buf, ExecutorOptionType::LzReceive, &payload);
        }
        for &(amount, receiver) in &self.native_drops {
            let mut payload = Vec::with_capacity(48);
            payload.put_u128(amount);
            payload.put_slice(receiver.as_bytes());
            put_segment(&mut buf, ExecutorOptionType::NativeDrop, &payload);
        }
        for (&index, &(gas, value)) in &self.compose {
            let mut payload = Vec::with_capacity(34);
            payload.put_u16(index);
            payload.put_u128(gas);
            payload.put_u128(value);
            put_segment(&mut buf, ExecutorOptionType::Compose, &payload);
        }
        if self.ordered {
            put_segment(&mut buf, ExecutorOptionType::OrderedExecution, &[]);
        }
        buf
    }

    /// Decode a blob back into a builder.
    ///
    /// Both the empty-bytes sentinel and the single-zero-byte sentinel
    /// decode to "no options". Repeated segments combine per the merge
    /// rules, so decode is the semantic inverse of encode.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if is_no_options(bytes) {
            return Ok(Self::default());
        }

        let mut options = Self::default();
        let mut buf = bytes;
        while buf.has_remaining() {
            let offset = bytes.len() - buf.remaining();
            if buf.remaining() < 4 {
                return Err(CodecError::Truncated {
                    offset,
                    needed: 4 - buf.remaining(),
                });
            }
            let worker_id = buf.get_u8();
            if worker_id != EXECUTOR_WORKER_ID {
                return Err(CodecError::UnknownWorker(worker_id));
            }
            let segment_len = buf.get_u16() as usize;
            if segment_len == 0 || buf.remaining() < segment_len {
                return Err(CodecError::Truncated {
                    offset,
                    needed: segment_len.saturating_sub(buf.remaining()).max(1),
                });
            }
            let option_tag = buf.get_u8();
            let mut payload = &buf[..segment_len - 1];
            buf.advance(segment_len - 1);

            let option_type = ExecutorOptionType::from_u8(option_tag)
                .ok_or(CodecError::UnknownOptionType(option_tag))?;
            let expected_len = match option_type {
                ExecutorOptionType::LzReceive => 32,
                ExecutorOptionType::NativeDrop => 48,
                ExecutorOptionType::Compose => 34,
                ExecutorOptionType::OrderedExecution => 0,
            };
            if payload.len() != expected_len {
                return Err(CodecError::SegmentLengthMismatch {
                    option_type: option_tag,
                    declared: segment_len,
                });
            }

            match option_type {
                ExecutorOptionType::LzReceive => {
                    let gas = payload.get_u128();
                    let value = payload.get_u128();
                    options.add_lz_receive(gas, value);
                }
                ExecutorOptionType::NativeDrop => {
                    let amount = payload.get_u128();
                    let mut receiver = [0u8; 32];
                    payload.copy_to_slice(&mut receiver);
                    options.add_native_drop(amount, Address(receiver));
                }
                ExecutorOptionType::Compose => {
                    let index = payload.get_u16();
                    let gas = payload.get_u128();
                    let value = payload.get_u128();
                    options.add_compose(index, gas, value);
                }
                ExecutorOptionType::OrderedExecution => {
                    options.add_ordered_execution();
                }
            }
        }

        Ok(options)
    }
}

/// Whether a raw blob means "no enforced options".
///
/// On-chain state may report either empty bytes or the single-zero-byte
/// empty document; the two are distinct on the wire but normalize to the
/// same value before comparison.
pub fn is_no_options(bytes: &[u8]) -> bool {
    bytes.is_empty() || bytes == [0u8]
}

/// Merge a list of declarations into one options blob per message type.
///
/// The returned map is ordered by message type so downstream transaction
/// batches are deterministic.
pub fn build_enforced_options(declarations: &[EnforcedOption]) -> BTreeMap<u16, Options> {
    let mut by_msg_type: BTreeMap<u16, Options> = BTreeMap::new();
    for decl in declarations {
        by_msg_type
            .entry(decl.msg_type())
            .or_default()
            .add_declaration(decl);
    }
    by_msg_type
}

fn put_segment(buf: &mut Vec<u8>, option_type: ExecutorOptionType, payload: &[u8]) {
    buf.put_u8(EXECUTOR_WORKER_ID);
    buf.put_u16((payload.len() + 1) as u16);
    buf.put_u8(option_type.to_u8());
    buf.put_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_roundtrip() {
        for option_type in [
            ExecutorOptionType::LzReceive,
            ExecutorOptionType::NativeDrop,
            ExecutorOptionType::Compose,
            ExecutorOptionType::OrderedExecution,
        ] {
            assert_eq!(
                ExecutorOptionType::from_u8(option_type.to_u8()),
                Some(option_type)
            );
        }
        assert_eq!(ExecutorOptionType::from_u8(0), None);
        assert_eq!(ExecutorOptionType::from_u8(5), None);
    }

    #[test]
    fn test_lz_receive_accumulates() {
        let mut split = Options::new();
        split.add_lz_receive(200_000, 1).add_lz_receive(500_000, 0);

        let mut combined = Options::new();
        combined.add_lz_receive(700_000, 1);

        assert_eq!(split.encode(), combined.encode());
    }

    #[test]
    fn test_compose_sums_per_index() {
        let mut options = Options::new();
        options.add_compose(0, 100_000, 0).add_compose(0, 50_000, 0);

        let decoded = Options::decode(&options.encode()).unwrap();
        assert_eq!(decoded.compose_options(), vec![(0, 150_000, 0)]);
    }

    #[test]
    fn test_compose_distinct_indexes_ordered() {
        let mut options = Options::new();
        options.add_compose(2, 30, 0).add_compose(0, 10, 0).add_compose(1, 20, 0);

        let decoded = Options::decode(&options.encode()).unwrap();
        assert_eq!(
            decoded.compose_options(),
            vec![(0, 10, 0), (1, 20, 0), (2, 30, 0)]
        );
    }

    #[test]
    fn test_native_drops_stay_independent() {
        let receiver = Address::from_bytes([0xAA; 32]);
        let mut options = Options::new();
        options.add_native_drop(5, receiver).add_native_drop(5, receiver);

        let decoded = Options::decode(&options.encode()).unwrap();
        assert_eq!(decoded.native_drops(), &[(5, receiver), (5, receiver)]);
    }

    #[test]
    fn test_ordered_execution_idempotent() {
        let mut once = Options::new();
        once.add_ordered_execution();
        let mut twice = Options::new();
        twice.add_ordered_execution().add_ordered_execution();

        assert_eq!(once.encode(), twice.encode());
    }

    #[test]
    fn test_empty_sentinels_decode_equal() {
        let from_empty = Options::decode(&[]).unwrap();
        let from_zero_byte = Options::decode(&[0x00]).unwrap();
        assert!(from_empty.is_empty());
        assert_eq!(from_empty, from_zero_byte);
    }

    #[test]
    fn test_absent_types_decode_to_zero_values() {
        let mut options = Options::new();
        options.add_ordered_execution();
        let decoded = Options::decode(&options.encode()).unwrap();

        assert_eq!(decoded.lz_receive(), (0, 0));
        assert!(decoded.native_drops().is_empty());
        assert!(decoded.compose_options().is_empty());
        assert!(decoded.ordered_execution());
    }

    #[test]
    fn test_full_roundtrip() {
        let mut options = Options::new();
        options
            .add_lz_receive(200_000, 1)
            .add_native_drop(1_000, Address::from_bytes([0xBB; 32]))
            .add_compose(1, 75_000, 2)
            .add_ordered_execution();

        let encoded = options.encode();
        let decoded = Options::decode(&encoded).unwrap();
        assert_eq!(decoded, options);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_decode_rejects_unknown_worker() {
        let mut options = Options::new();
        options.add_ordered_execution();
        let mut bytes = options.encode();
        bytes[0] = 0x07;
        assert!(matches!(
            Options::decode(&bytes).unwrap_err(),
            CodecError::UnknownWorker(0x07)
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_option_type() {
        let mut options = Options::new();
        options.add_ordered_execution();
        let mut bytes = options.encode();
        bytes[3] = 0x09;
        assert!(matches!(
            Options::decode(&bytes).unwrap_err(),
            CodecError::UnknownOptionType(0x09)
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_segment() {
        let mut options = Options::new();
        options.add_lz_receive(1, 1);
        let bytes = options.encode();
        assert!(matches!(
            Options::decode(&bytes[..bytes.len() - 4]).unwrap_err(),
            CodecError::Truncated { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        // OrderedExecution with a declared payload byte it must not have.
        let bytes = vec![EXECUTOR_WORKER_ID, 0x00, 0x02, 0x04, 0xFF];
        assert!(matches!(
            Options::decode(&bytes).unwrap_err(),
            CodecError::SegmentLengthMismatch { option_type: 0x04, .. }
        ));
    }

    #[test]
    fn test_build_enforced_options_groups_by_msg_type() {
        let receiver = Address::from_bytes([0xCC; 32]);
        let declarations = vec![
            EnforcedOption::LzReceive { msg_type: 1, gas: 200_000, value: 1 },
            EnforcedOption::LzReceive { msg_type: 1, gas: 500_000, value: 0 },
            EnforcedOption::NativeDrop { msg_type: 2, amount: 9, receiver },
            EnforcedOption::OrderedExecution { msg_type: 2 },
        ];

        let grouped = build_enforced_options(&declarations);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1].lz_receive(), (700_000, 1));
        assert_eq!(grouped[&2].native_drops(), &[(9, receiver)]);
        assert!(grouped[&2].ordered_execution());
    }
}
