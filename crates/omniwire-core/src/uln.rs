//! ULN (verification) configuration: user-declared form, canonical
//! serializable form, and the default-sentinel rules between them.
//!
//! The canonical byte encoding is the equality oracle for diffing: both the
//! declared config and the on-chain config are serialized with DVN sets
//! sorted, and compared byte-for-byte. A declaration that differs only in
//! DVN array order therefore diffs as equal.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, ConfigError};
use crate::types::Address;

/// Sentinel DVN count meaning "no required DVNs". Used instead of 0 because
/// a count of 0 falls back to the chain default.
pub const NIL_DVN_COUNT: u8 = u8::MAX;

/// ULN configuration as declared by the user.
///
/// Every field is optional at the type level, but presence is validated:
/// `required_dvns`, `optional_dvns` and `optional_dvn_threshold` must be
/// explicitly present (an empty array / zero means "use chain defaults"),
/// while a missing field is an error. This keeps "I want defaults" an
/// intentional statement rather than an accident of omission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UlnUserConfig {
    /// Block confirmations to wait for; `None` or `0` means chain default.
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// DVNs that must all verify. Empty means chain default.
    #[serde(default)]
    pub required_dvns: Option<Vec<Address>>,
    /// DVNs of which `optional_dvn_threshold` must verify. Empty means
    /// chain default.
    #[serde(default)]
    pub optional_dvns: Option<Vec<Address>>,
    /// How many optional DVNs must verify.
    #[serde(default)]
    pub optional_dvn_threshold: Option<u8>,
}

/// The canonical, serializable ULN configuration.
///
/// Mirrors the on-chain struct: raw values plus three use-default flags. The
/// remote contract ignores a raw value when the corresponding flag is set,
/// but the value is still serialized deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlnConfig {
    pub confirmations: u64,
    pub optional_dvn_threshold: u8,
    pub required_dvns: Vec<Address>,
    pub optional_dvns: Vec<Address>,
    pub use_default_for_confirmations: bool,
    pub use_default_for_required_dvns: bool,
    pub use_default_for_optional_dvns: bool,
}

impl UlnConfig {
    /// Normalize a user declaration into the canonical form.
    ///
    /// Fails fast on ambiguous declarations; `pathway` names the offending
    /// connection in the error.
    pub fn from_user(user: &UlnUserConfig, pathway: &str) -> Result<Self, ConfigError> {
        let required_dvns = user
            .required_dvns
            .clone()
            .ok_or_else(|| ConfigError::MissingRequiredDvns {
                pathway: pathway.to_string(),
            })?;
        let optional_dvns = user
            .optional_dvns
            .clone()
            .ok_or_else(|| ConfigError::MissingOptionalDvns {
                pathway: pathway.to_string(),
            })?;
        let optional_dvn_threshold =
            user.optional_dvn_threshold
                .ok_or_else(|| ConfigError::MissingOptionalDvnThreshold {
                    pathway: pathway.to_string(),
                })?;

        let confirmations = user.confirmations.unwrap_or(0);

        Ok(Self {
            confirmations,
            optional_dvn_threshold,
            use_default_for_confirmations: confirmations == 0,
            use_default_for_required_dvns: required_dvns.is_empty(),
            use_default_for_optional_dvns: optional_dvns.is_empty(),
            required_dvns,
            optional_dvns,
        })
    }

    /// Sort the DVN sets in place. Membership is the only comparable fact;
    /// remote storage order is not guaranteed to match declaration order.
    pub fn canonicalize(&mut self) {
        self.required_dvns.sort_unstable();
        self.optional_dvns.sort_unstable();
    }

    /// Serialize the canonical form: DVN sets sorted, then encoded.
    ///
    /// This is both the diff oracle and the `set_config` payload.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut canonical = self.clone();
        canonical.canonicalize();
        canonical.to_bytes()
    }

    /// Encode in declared field order without re-sorting.
    ///
    /// Layout (little-endian): `confirmations u64`, `threshold u8`,
    /// `required count u8` (255 = NIL for an empty set), required DVNs as
    /// 32-byte entries, `optional count u8`, optional DVNs, three `bool`s.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(12 + 32 * (self.required_dvns.len() + self.optional_dvns.len()) + 3);
        buf.put_u64_le(self.confirmations);
        buf.put_u8(self.optional_dvn_threshold);
        let required_count = if self.required_dvns.is_empty() {
            NIL_DVN_COUNT
        } else {
            self.required_dvns.len() as u8
        };
        buf.put_u8(required_count);
        for dvn in &self.required_dvns {
            buf.put_slice(dvn.as_bytes());
        }
        buf.put_u8(self.optional_dvns.len() as u8);
        for dvn in &self.optional_dvns {
            buf.put_slice(dvn.as_bytes());
        }
        buf.put_u8(self.use_default_for_confirmations as u8);
        buf.put_u8(self.use_default_for_required_dvns as u8);
        buf.put_u8(self.use_default_for_optional_dvns as u8);
        buf
    }

    /// Decode the exact inverse of [`to_bytes`](Self::to_bytes).
    ///
    /// The NIL required-DVN count decodes back to an empty set.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut buf = bytes;
        let confirmations = read_u64_le(&mut buf, bytes.len())?;
        let optional_dvn_threshold = read_u8(&mut buf, bytes.len())?;

        let required_count = read_u8(&mut buf, bytes.len())?;
        let required_count = if required_count == NIL_DVN_COUNT {
            0
        } else {
            required_count as usize
        };
        let mut required_dvns = Vec::with_capacity(required_count);
        for _ in 0..required_count {
            required_dvns.push(read_address(&mut buf, bytes.len())?);
        }

        let optional_count = read_u8(&mut buf, bytes.len())? as usize;
        let mut optional_dvns = Vec::with_capacity(optional_count);
        for _ in 0..optional_count {
            optional_dvns.push(read_address(&mut buf, bytes.len())?);
        }

        let use_default_for_confirmations = read_u8(&mut buf, bytes.len())? != 0;
        let use_default_for_required_dvns = read_u8(&mut buf, bytes.len())? != 0;
        let use_default_for_optional_dvns = read_u8(&mut buf, bytes.len())? != 0;

        if !buf.is_empty() {
            return Err(CodecError::TrailingBytes(buf.len()));
        }

        Ok(Self {
            confirmations,
            optional_dvn_threshold,
            required_dvns,
            optional_dvns,
            use_default_for_confirmations,
            use_default_for_required_dvns,
            use_default_for_optional_dvns,
        })
    }
}

fn read_u8(buf: &mut &[u8], total: usize) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Truncated {
            offset: total - buf.remaining(),
            needed: 1,
        });
    }
    Ok(buf.get_u8())
}

fn read_u64_le(buf: &mut &[u8], total: usize) -> Result<u64, CodecError> {
    if buf.remaining() < 8 {
        return Err(CodecError::Truncated {
            offset: total - buf.remaining(),
            needed: 8 - buf.remaining(),
        });
    }
    Ok(buf.get_u64_le())
}

fn read_address(buf: &mut &[u8], total: usize) -> Result<Address, CodecError> {
    if buf.remaining() < 32 {
        return Err(CodecError::Truncated {
            offset: total - buf.remaining(),
            needed: 32 - buf.remaining(),
        });
    }
    let mut arr = [0u8; 32];
    buf.copy_to_slice(&mut arr);
    Ok(Address(arr))
}
