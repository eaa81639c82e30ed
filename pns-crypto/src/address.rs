use pns_types::primitives::Address;

use crate::hash::blake3_hash_domain;

const CONTRACT_ADDRESS_CONTEXT: &str = "pns contract address";

/// Derive the fixed identity of a protocol component from its name.
/// Address = BLAKE3-derive-key("pns contract address", name)[0..20]
pub fn contract_address(name: &str) -> Address {
    let hash = blake3_hash_domain(CONTRACT_ADDRESS_CONTEXT, name.as_bytes());
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[..20]);
    address
}
