use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::primitives::*;

/// Notifications emitted by committed operations.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // ─── Node Registry ───────────────────────────────────────────────────────
    NewOwner {
        parent: Node,
        label: LabelHash,
        owner: Address,
    },
    Transfer {
        node: Node,
        owner: Address,
    },
    NewResolver {
        node: Node,
        resolver: Option<Address>,
    },
    NewTtl {
        node: Node,
        ttl: Ttl,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },

    // ─── Base Registrar ──────────────────────────────────────────────────────
    ControllerAdded {
        controller: Address,
    },
    ControllerRemoved {
        controller: Address,
    },
    LabelRegistered {
        label: LabelHash,
        owner: Address,
        expires: Timestamp,
    },
    LabelRenewed {
        label: LabelHash,
        expires: Timestamp,
    },
    LabelTransferred {
        label: LabelHash,
        from: Address,
        to: Address,
    },

    // ─── Registrar Controller ────────────────────────────────────────────────
    CommitmentRecorded {
        commitment: CommitmentHash,
        timestamp: Timestamp,
    },
    NameRegistered {
        name: String,
        label: LabelHash,
        owner: Address,
        cost: Amount,
        expires: Timestamp,
    },
    NameRenewed {
        name: String,
        label: LabelHash,
        cost: Amount,
        expires: Timestamp,
    },
    Withdrawn {
        to: Address,
        amount: Amount,
    },

    // ─── Resolver ────────────────────────────────────────────────────────────
    AddrChanged {
        node: Node,
        addr: Address,
    },
    NameChanged {
        node: Node,
        name: String,
    },
    TextChanged {
        node: Node,
        key: String,
        value: String,
    },
    RecordsCleared {
        node: Node,
    },

    // ─── Reverse Registrar ───────────────────────────────────────────────────
    ReverseClaimed {
        addr: Address,
        node: Node,
    },
    DefaultResolverChanged {
        resolver: Address,
    },

    // ─── Administration ──────────────────────────────────────────────────────
    OwnershipTransferred {
        contract: Address,
        previous_owner: Address,
        new_owner: Address,
    },
}

impl Event {
    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::NewOwner { .. } => "NewOwner",
            Event::Transfer { .. } => "Transfer",
            Event::NewResolver { .. } => "NewResolver",
            Event::NewTtl { .. } => "NewTtl",
            Event::ApprovalForAll { .. } => "ApprovalForAll",
            Event::ControllerAdded { .. } => "ControllerAdded",
            Event::ControllerRemoved { .. } => "ControllerRemoved",
            Event::LabelRegistered { .. } => "LabelRegistered",
            Event::LabelRenewed { .. } => "LabelRenewed",
            Event::LabelTransferred { .. } => "LabelTransferred",
            Event::CommitmentRecorded { .. } => "CommitmentRecorded",
            Event::NameRegistered { .. } => "NameRegistered",
            Event::NameRenewed { .. } => "NameRenewed",
            Event::Withdrawn { .. } => "Withdrawn",
            Event::AddrChanged { .. } => "AddrChanged",
            Event::NameChanged { .. } => "NameChanged",
            Event::TextChanged { .. } => "TextChanged",
            Event::RecordsCleared { .. } => "RecordsCleared",
            Event::ReverseClaimed { .. } => "ReverseClaimed",
            Event::DefaultResolverChanged { .. } => "DefaultResolverChanged",
            Event::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}
