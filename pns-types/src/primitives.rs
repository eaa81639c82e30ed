/// 32-byte BLAKE3 hash.
pub type Hash = [u8; 32];

/// 20-byte identity of a caller or a protocol component.
pub type Address = [u8; 20];

/// Hash identifying a point in the namespace tree.
pub type Node = Hash;

/// BLAKE3 hash of a single name segment.
pub type LabelHash = Hash;

/// Commitment hash submitted during the commit phase.
pub type CommitmentHash = Hash;

/// 32-byte secret mixed into a commitment.
pub type Secret = [u8; 32];

/// Amount of the payment token (18 decimals).
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Time-to-live hint for resolvers, in seconds.
pub type Ttl = u64;

/// The zero address; reads back as "no owner".
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The root of the namespace tree.
pub const ROOT_NODE: Node = [0u8; 32];

/// Format an address as a 0x-prefixed lowercase hex string.
pub fn address_to_hex(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr))
}

/// Format a hash as a 0x-prefixed lowercase hex string.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a hex address, with or without the 0x prefix.
pub fn parse_address(s: &str) -> Option<Address> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).ok()?;
    bytes.try_into().ok()
}

/// Parse a 32-byte hex value, with or without the 0x prefix.
pub fn parse_hash(s: &str) -> Option<Hash> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).ok()?;
    bytes.try_into().ok()
}
