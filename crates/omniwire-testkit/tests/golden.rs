//! Golden vector verification for the binary codecs.

use omniwire_core::{Options, UlnConfig};
use omniwire_testkit::vectors::{config_vectors, options_vectors};

#[test]
fn test_options_vectors_encode_exactly() {
    for vector in options_vectors() {
        let encoded = (vector.build)().encode();
        assert_eq!(
            hex::encode(&encoded),
            vector.expected_hex,
            "vector {} ({}) drifted",
            vector.name,
            vector.description
        );
    }
}

#[test]
fn test_options_vectors_roundtrip() {
    for vector in options_vectors() {
        let bytes = hex::decode(vector.expected_hex).unwrap();
        let decoded = Options::decode(&bytes).unwrap();
        assert_eq!(
            decoded.encode(),
            bytes,
            "vector {} does not re-encode to itself",
            vector.name
        );
    }
}

#[test]
fn test_config_vectors_encode_exactly() {
    for vector in config_vectors() {
        assert_eq!(
            hex::encode((vector.bytes)()),
            vector.expected_hex,
            "vector {} ({}) drifted",
            vector.name,
            vector.description
        );
    }
}

#[test]
fn test_uln_vectors_reserialize_identically() {
    for vector in config_vectors().iter().filter(|v| v.name.starts_with("uln")) {
        let bytes = hex::decode(vector.expected_hex).unwrap();
        let decoded = UlnConfig::from_bytes(&bytes).unwrap();
        assert_eq!(
            decoded.canonical_bytes(),
            bytes,
            "vector {} is not a canonical fixed point",
            vector.name
        );
    }
}
