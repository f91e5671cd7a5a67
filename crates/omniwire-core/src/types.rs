//! Strong type definitions for omniwire.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An endpoint identifier: one messaging endpoint deployment on one chain.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Eid(pub u32);

impl Eid {
    /// Create a new endpoint identifier.
    pub const fn new(eid: u32) -> Self {
        Self(eid)
    }

    /// Get the raw value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Eid({})", self.0)
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Eid {
    fn from(eid: u32) -> Self {
        Self(eid)
    }
}

/// A 32-byte canonical address.
///
/// Chains with narrower native addresses (20-byte EVM) are left-padded with
/// zeroes so that peer and config comparisons work across chain families.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zeroes address (used as an "unset" sentinel on-chain).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create an address from raw 32 bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    ///
    /// Inputs shorter than 32 bytes are left-padded with zeroes, so both
    /// 20-byte EVM addresses and full 32-byte addresses parse to the same
    /// canonical form.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        if bytes.len() > 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Check whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}…)", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

// Addresses appear in declarative config files, so they serialize as hex
// strings rather than byte arrays.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(|e| D::Error::custom(format!("invalid address {s:?}: {e}")))
    }
}

/// A contract instance on a specific chain: the endpoint reference every
/// pathway hangs off of. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OmniPoint {
    /// The endpoint the contract lives on.
    pub eid: Eid,
    /// The contract address in canonical 32-byte form.
    pub address: Address,
}

impl OmniPoint {
    /// Create a new point.
    pub const fn new(eid: Eid, address: Address) -> Self {
        Self { eid, address }
    }
}

impl fmt::Display for OmniPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.eid, self.address)
    }
}

/// Message library configuration domains, as understood by `get_config` /
/// `set_config` on the message-routing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ConfigType {
    /// Executor configuration (max message size, executor address).
    Executor = 1,
    /// Send-side ULN verification configuration.
    SendUln = 2,
    /// Receive-side ULN verification configuration.
    RecvUln = 3,
}

impl ConfigType {
    /// Convert to the on-chain config type discriminant.
    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// Try to parse from the on-chain discriminant.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Executor),
            2 => Some(Self::SendUln),
            3 => Some(Self::RecvUln),
            _ => None,
        }
    }
}
