//! Proptest strategies for omniwire types.

use proptest::collection::vec;
use proptest::prelude::*;

use omniwire_core::{Address, EnforcedOption, UlnUserConfig};

/// Any 32-byte address.
pub fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(Address::from_bytes)
}

/// A DVN set of up to `max` addresses.
pub fn arb_dvn_set(max: usize) -> impl Strategy<Value = Vec<Address>> {
    vec(arb_address(), 0..=max)
}

/// A fully explicit ULN user config, the only kind that normalizes without
/// error.
pub fn arb_uln_user_config() -> impl Strategy<Value = UlnUserConfig> {
    (
        any::<u64>(),
        arb_dvn_set(4),
        arb_dvn_set(4),
        any::<u8>(),
    )
        .prop_map(
            |(confirmations, required_dvns, optional_dvns, threshold)| UlnUserConfig {
                confirmations: Some(confirmations),
                required_dvns: Some(required_dvns),
                optional_dvns: Some(optional_dvns),
                optional_dvn_threshold: Some(threshold),
            },
        )
}

/// Any single enforced-option declaration.
///
/// Gas, value and amount are bounded to 64 bits so that summing a handful
/// of declarations never saturates the u128 accumulators.
pub fn arb_enforced_option() -> impl Strategy<Value = EnforcedOption> {
    let msg_type = 0u16..8;
    let amount = (0u64..).prop_map(u128::from);
    prop_oneof![
        (msg_type.clone(), amount.clone(), amount.clone()).prop_map(|(msg_type, gas, value)| {
            EnforcedOption::LzReceive { msg_type, gas, value }
        }),
        (msg_type.clone(), amount.clone(), arb_address()).prop_map(
            |(msg_type, amount, receiver)| EnforcedOption::NativeDrop {
                msg_type,
                amount,
                receiver
            }
        ),
        (msg_type.clone(), 0u16..4, amount.clone(), amount).prop_map(
            |(msg_type, index, gas, value)| EnforcedOption::Compose { msg_type, index, gas, value }
        ),
        msg_type.prop_map(|msg_type| EnforcedOption::OrderedExecution { msg_type }),
    ]
}

/// Up to `max` enforced-option declarations.
pub fn arb_enforced_options(max: usize) -> impl Strategy<Value = Vec<EnforcedOption>> {
    vec(arb_enforced_option(), 0..=max)
}
