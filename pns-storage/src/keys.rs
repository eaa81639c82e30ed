//! Persisted key layout.
//!
//! Every table is a key prefix; the suffix is the raw bytes of the table key.
//! Values are borsh-encoded.

use pns_types::primitives::{Address, CommitmentHash, LabelHash, Node};

/// Logical tables of the name service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// node hash -> `NodeRecord`
    Nodes,
    /// owner ‖ operator -> `()`
    Operators,
    /// label hash -> `Registration`
    Labels,
    /// controller address -> `()`
    Controllers,
    /// commitment hash -> `Timestamp`
    Commitments,
    /// node hash -> `ResolverRecords`
    Records,
    /// deployment metadata, authorities, balances
    Meta,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Nodes,
        Table::Operators,
        Table::Labels,
        Table::Controllers,
        Table::Commitments,
        Table::Records,
        Table::Meta,
    ];

    /// Key prefix of the table.
    pub fn prefix(self) -> &'static [u8] {
        match self {
            Table::Nodes => b"pns:node:",
            Table::Operators => b"pns:operator:",
            Table::Labels => b"pns:label:",
            Table::Controllers => b"pns:controller:",
            Table::Commitments => b"pns:commitment:",
            Table::Records => b"pns:record:",
            Table::Meta => b"pns:meta:",
        }
    }

    /// Short name, also used as the RocksDB column family.
    pub fn name(self) -> &'static str {
        match self {
            Table::Nodes => "nodes",
            Table::Operators => "operators",
            Table::Labels => "labels",
            Table::Controllers => "controllers",
            Table::Commitments => "commitments",
            Table::Records => "records",
            Table::Meta => "meta",
        }
    }

    /// The table a full key belongs to, if any.
    pub fn of_key(key: &[u8]) -> Option<Table> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| key.starts_with(t.prefix()))
    }

    /// Build a key in this table from its suffix parts.
    pub fn key(self, parts: &[&[u8]]) -> Vec<u8> {
        let prefix = self.prefix();
        let len = prefix.len() + parts.iter().map(|p| p.len()).sum::<usize>();
        let mut key = Vec::with_capacity(len);
        key.extend_from_slice(prefix);
        for part in parts {
            key.extend_from_slice(part);
        }
        key
    }
}

pub fn node_key(node: &Node) -> Vec<u8> {
    Table::Nodes.key(&[&node[..]])
}

pub fn operator_key(owner: &Address, operator: &Address) -> Vec<u8> {
    Table::Operators.key(&[&owner[..], &operator[..]])
}

pub fn label_key(label: &LabelHash) -> Vec<u8> {
    Table::Labels.key(&[&label[..]])
}

pub fn controller_key(controller: &Address) -> Vec<u8> {
    Table::Controllers.key(&[&controller[..]])
}

pub fn commitment_key(commitment: &CommitmentHash) -> Vec<u8> {
    Table::Commitments.key(&[&commitment[..]])
}

pub fn record_key(node: &Node) -> Vec<u8> {
    Table::Records.key(&[&node[..]])
}

/// Metadata entry names under [`Table::Meta`].
pub mod meta {
    pub const DEPLOYMENT: &str = "deployment";
    pub const AUTHORITY: &str = "authority";
    pub const BALANCE: &str = "balance";
    pub const DEFAULT_RESOLVER: &str = "default_resolver";
}

/// Singleton metadata entry.
pub fn meta_key(name: &str) -> Vec<u8> {
    Table::Meta.key(&[name.as_bytes()])
}

/// Per-component metadata entry (authority, balance, default resolver).
pub fn meta_key_for(name: &str, component: &Address) -> Vec<u8> {
    Table::Meta.key(&[name.as_bytes(), b":".as_slice(), &component[..]])
}

/// Strip the table prefix and return the fixed-size suffix.
pub fn suffix<const N: usize>(table: Table, key: &[u8]) -> Option<[u8; N]> {
    key.strip_prefix(table.prefix())
        .and_then(|rest| rest.try_into().ok())
}
