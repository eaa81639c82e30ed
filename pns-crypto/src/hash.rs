//! BLAKE3 primitives behind label hashes, nodes, commitments and component
//! identities.

use pns_types::primitives::Hash;

/// Plain BLAKE3 digest; used for label hashes.
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// BLAKE3 in key-derivation mode under `context`.
///
/// Commitments and component identities each use their own context.
pub fn blake3_hash_domain(context: &str, data: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Digest of the concatenation of `parts`, streamed without allocating.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> Hash {
    parts
        .iter()
        .fold(blake3::Hasher::new(), |mut hasher, part| {
            hasher.update(part);
            hasher
        })
        .finalize()
        .into()
}
