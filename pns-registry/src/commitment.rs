use pns_crypto::hash::blake3_hash_domain;
use pns_storage::name_store::encode;
use pns_types::primitives::*;
use pns_types::record::ResolverRecord;

use crate::error::RegistryError;

/// Key-derivation context of commitment hashes.
pub const COMMITMENT_CONTEXT: &str = "pns commitment v1";

/// Compute the commitment hash of a registration request.
///
/// The preimage is the borsh encoding of
/// `(labelHash, owner, duration, secret, resolver, records)`.
pub fn make_commitment(
    label: &LabelHash,
    owner: &Address,
    duration: u64,
    secret: &Secret,
    resolver: Option<Address>,
    records: &[ResolverRecord],
) -> Result<CommitmentHash, RegistryError> {
    let preimage = encode(&(*label, *owner, duration, *secret, resolver, records))?;
    Ok(blake3_hash_domain(COMMITMENT_CONTEXT, &preimage))
}

/// True once a commitment made at `committed_at` can no longer be revealed.
pub fn is_stale(committed_at: Timestamp, now: Timestamp, max_age: u64) -> bool {
    now.saturating_sub(committed_at) > max_age
}

/// Check that a commitment made at `committed_at` may be revealed at `now`.
pub fn validate_commitment_age(
    committed_at: Timestamp,
    now: Timestamp,
    min_age: u64,
    max_age: u64,
) -> Result<(), RegistryError> {
    // A commitment from the future has not aged at all.
    let too_new = match now.checked_sub(committed_at) {
        Some(age) => age < min_age,
        None => true,
    };
    if too_new {
        return Err(RegistryError::CommitmentTooNew {
            committed_at,
            now,
            min_age,
        });
    }

    let age = now - committed_at;
    if age > max_age {
        return Err(RegistryError::CommitmentTooOld { age, max_age });
    }

    Ok(())
}
