//! Canonical serialization for deterministic fingerprints.
//!
//! Thread fingerprints, policy parameter hashes, graph fingerprints and the
//! report hash are all computed here so that every artifact of an analysis
//! run hashes the same way.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Floats are quantized before hashing (see [`quantize`])

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Serialize a value to canonical JSON bytes, surfacing serializer errors.
pub fn try_to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// Serialize a value to canonical JSON bytes for hashing.
///
/// The crate's own hashed types always serialize. If a value does not, the
/// failure is logged and the bytes become a marker naming the type and the
/// error, so unserializable values never share the empty-input hash.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    match try_to_canonical_bytes(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            let type_name = std::any::type_name::<T>();
            tracing::error!(type_name, error = %err, "Canonical serialization failed");
            format!("unserializable:{type_name}:{err}").into_bytes()
        }
    }
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Quantize a float to an i64 (×1e6, rounded) for hashing and stable comparison.
pub fn quantize(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}
