//! Namespace node derivation.
//!
//! A node is `BLAKE3(parent || labelHash)`, with the root at the all-zero hash,
//! so `namehash("tess.push") = make_node(make_node(ROOT, lh("push")), lh("tess"))`.

use pns_types::constants::{ADDR_REVERSE_LABEL, REVERSE_LABEL};
use pns_types::name::split_name;
use pns_types::primitives::{Address, LabelHash, Node, ROOT_NODE};

use crate::hash::{blake3_hash, blake3_hash_multi};

/// Hash a single label.
pub fn label_hash(label: &str) -> LabelHash {
    blake3_hash(label.as_bytes())
}

/// Derive the child node of `parent` for the given label hash.
pub fn make_node(parent: &Node, label: &LabelHash) -> Node {
    blake3_hash_multi(&[parent, label])
}

/// Derive the node of a dotted name. The empty name is the root.
pub fn namehash(name: &str) -> Node {
    split_name(name)
        .iter()
        .rev()
        .fold(ROOT_NODE, |node, label| make_node(&node, &label_hash(label)))
}

/// Node of the `addr.reverse` namespace.
pub fn addr_reverse_node() -> Node {
    namehash(&format!("{}.{}", ADDR_REVERSE_LABEL, REVERSE_LABEL))
}

/// Reverse label of an address: lowercase hex without prefix.
pub fn reverse_label(addr: &Address) -> String {
    hex::encode(addr)
}

/// Reverse node of an address under `addr.reverse`.
pub fn reverse_node(addr: &Address) -> Node {
    make_node(&addr_reverse_node(), &label_hash(&reverse_label(addr)))
}
