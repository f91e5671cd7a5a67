//! Golden byte vectors for the binary codecs.
//!
//! Every implementation of the wire formats must produce these exact
//! bytes. The vectors pin the segment layout, integer endianness, the NIL
//! DVN sentinel, and the use-default flag ordering against accidental
//! format drift.

use omniwire_core::{Address, ExecutorConfig, Options, UlnConfig, UlnUserConfig};

/// One options-codec vector: a builder recipe and its expected encoding.
pub struct OptionsVector {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Options,
    pub expected_hex: &'static str,
}

/// One config-codec vector: canonical bytes and their expected encoding.
pub struct ConfigVector {
    pub name: &'static str,
    pub description: &'static str,
    pub bytes: fn() -> Vec<u8>,
    pub expected_hex: &'static str,
}

/// All options-codec vectors.
pub fn options_vectors() -> Vec<OptionsVector> {
    vec![
        OptionsVector {
            name: "lz-receive-200k",
            description: "single lzReceive segment, gas 200000, no value",
            build: || {
                let mut options = Options::new();
                options.add_lz_receive(200_000, 0);
                options
            },
            expected_hex: "0100210100000000000000000000000000030d4000000000000000000000000000000000",
        },
        OptionsVector {
            name: "lz-receive-accumulated",
            description: "two lzReceive declarations merge by summing gas and value",
            build: || {
                let mut options = Options::new();
                options.add_lz_receive(200_000, 1).add_lz_receive(500_000, 0);
                options
            },
            expected_hex: "01002101000000000000000000000000000aae6000000000000000000000000000000001",
        },
        OptionsVector {
            name: "ordered-only",
            description: "ordered execution flag, zero-length payload",
            build: || {
                let mut options = Options::new();
                options.add_ordered_execution();
                options
            },
            expected_hex: "01000104",
        },
        OptionsVector {
            name: "compose-index-1",
            description: "compose at index 1, gas 100000, value 2",
            build: || {
                let mut options = Options::new();
                options.add_compose(1, 100_000, 2);
                options
            },
            expected_hex: "010023030001000000000000000000000000000186a000000000000000000000000000000002",
        },
        OptionsVector {
            name: "native-drop-1000",
            description: "native drop of 1000 to a fixed receiver",
            build: || {
                let mut options = Options::new();
                options.add_native_drop(1_000, Address::from_bytes([0xBB; 32]));
                options
            },
            expected_hex: "01003102000000000000000000000000000003e8bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        },
    ]
}

/// All config-codec vectors.
pub fn config_vectors() -> Vec<ConfigVector> {
    vec![
        ConfigVector {
            name: "uln-all-defaults",
            description: "empty DVN sets and zero confirmations: NIL required count, all flags set",
            bytes: || {
                let user = UlnUserConfig {
                    confirmations: Some(0),
                    required_dvns: Some(vec![]),
                    optional_dvns: Some(vec![]),
                    optional_dvn_threshold: Some(0),
                };
                UlnConfig::from_user(&user, "vector").unwrap().canonical_bytes()
            },
            expected_hex: "000000000000000000ff00010101",
        },
        ConfigVector {
            name: "uln-one-of-each",
            description: "12 confirmations, one required and one optional DVN, threshold 1",
            bytes: || {
                let user = UlnUserConfig {
                    confirmations: Some(12),
                    required_dvns: Some(vec![Address::from_bytes([0x11; 32])]),
                    optional_dvns: Some(vec![Address::from_bytes([0x22; 32])]),
                    optional_dvn_threshold: Some(1),
                };
                UlnConfig::from_user(&user, "vector").unwrap().canonical_bytes()
            },
            expected_hex: "0c0000000000000001011111111111111111111111111111111111111111111111111111111111111111012222222222222222222222222222222222222222222222222222222222222222000000",
        },
        ConfigVector {
            name: "executor-10k",
            description: "max message size 10000, fixed executor",
            bytes: || {
                ExecutorConfig {
                    max_message_size: 10_000,
                    executor: Address::from_bytes([0xEE; 32]),
                }
                .canonical_bytes()
            },
            expected_hex: "10270000eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
        },
    ]
}
