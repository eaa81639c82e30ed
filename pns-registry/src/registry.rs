//! The namespace tree: node -> owner, resolver, TTL.

use pns_crypto::namehash::make_node;
use pns_storage::keys::{node_key, operator_key};
use pns_types::event::Event;
use pns_types::primitives::*;
use pns_types::record::NodeRecord;

use crate::error::RegistryError;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRegistry {
    pub address: Address,
}

impl NodeRegistry {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Give the root node to `owner`. Only used at genesis.
    pub fn init_root(&self, tx: &mut Transaction<'_>, owner: &Address) -> Result<(), RegistryError> {
        let record = NodeRecord {
            owner: *owner,
            ..NodeRecord::default()
        };
        tx.put(node_key(&ROOT_NODE), &record)?;
        tx.emit(Event::Transfer {
            node: ROOT_NODE,
            owner: *owner,
        });
        Ok(())
    }

    // ─── Lookups ────────────────────────────────────────────────────────────

    /// Attributes of a node; an unset node reads as the zero record.
    pub fn record(&self, tx: &Transaction<'_>, node: &Node) -> Result<NodeRecord, RegistryError> {
        Ok(tx.get(&node_key(node))?.unwrap_or_default())
    }

    pub fn owner(&self, tx: &Transaction<'_>, node: &Node) -> Result<Address, RegistryError> {
        Ok(self.record(tx, node)?.owner)
    }

    pub fn resolver(
        &self,
        tx: &Transaction<'_>,
        node: &Node,
    ) -> Result<Option<Address>, RegistryError> {
        Ok(self.record(tx, node)?.resolver)
    }

    pub fn ttl(&self, tx: &Transaction<'_>, node: &Node) -> Result<Ttl, RegistryError> {
        Ok(self.record(tx, node)?.ttl)
    }

    pub fn record_exists(&self, tx: &Transaction<'_>, node: &Node) -> Result<bool, RegistryError> {
        tx.exists(&node_key(node))
    }

    pub fn is_approved_for_all(
        &self,
        tx: &Transaction<'_>,
        owner: &Address,
        operator: &Address,
    ) -> Result<bool, RegistryError> {
        tx.exists(&operator_key(owner, operator))
    }

    /// True if `who` owns `node` or is an operator approved by its owner.
    pub fn is_authorised(
        &self,
        tx: &Transaction<'_>,
        node: &Node,
        who: &Address,
    ) -> Result<bool, RegistryError> {
        let owner = self.owner(tx, node)?;
        if owner == ZERO_ADDRESS {
            return Ok(false);
        }
        Ok(owner == *who || self.is_approved_for_all(tx, &owner, who)?)
    }

    fn require_authorised(&self, tx: &Transaction<'_>, node: &Node) -> Result<(), RegistryError> {
        let caller = tx.caller();
        if !self.is_authorised(tx, node, &caller)? {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&caller),
                reason: format!("may not modify node {}", hash_to_hex(node)),
            });
        }
        Ok(())
    }

    // ─── Mutations ──────────────────────────────────────────────────────────

    /// Transfer a node to a new owner.
    pub fn set_owner(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        owner: &Address,
    ) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        self.write_owner(tx, node, owner)
    }

    pub fn set_resolver(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        resolver: Option<Address>,
    ) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        let mut record = self.record(tx, node)?;
        record.resolver = resolver;
        tx.put(node_key(node), &record)?;
        tx.emit(Event::NewResolver {
            node: *node,
            resolver,
        });
        Ok(())
    }

    pub fn set_ttl(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        ttl: Ttl,
    ) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        let mut record = self.record(tx, node)?;
        record.ttl = ttl;
        tx.put(node_key(node), &record)?;
        tx.emit(Event::NewTtl { node: *node, ttl });
        Ok(())
    }

    /// Set owner, resolver and TTL of a node in one step.
    pub fn set_record(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        owner: &Address,
        resolver: Option<Address>,
        ttl: Ttl,
    ) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        self.write_owner(tx, node, owner)?;
        self.write_resolver_and_ttl(tx, node, resolver, ttl)
    }

    /// Create or reassign the child `label` of `parent`. Returns the child node.
    pub fn set_subnode_owner(
        &self,
        tx: &mut Transaction<'_>,
        parent: &Node,
        label: &LabelHash,
        owner: &Address,
    ) -> Result<Node, RegistryError> {
        self.require_authorised(tx, parent)?;
        let node = make_node(parent, label);
        let mut record = self.record(tx, &node)?;
        record.owner = *owner;
        tx.put(node_key(&node), &record)?;
        tx.emit(Event::NewOwner {
            parent: *parent,
            label: *label,
            owner: *owner,
        });
        Ok(node)
    }

    /// Like [`set_subnode_owner`](Self::set_subnode_owner), also setting
    /// resolver and TTL of the child.
    pub fn set_subnode_record(
        &self,
        tx: &mut Transaction<'_>,
        parent: &Node,
        label: &LabelHash,
        owner: &Address,
        resolver: Option<Address>,
        ttl: Ttl,
    ) -> Result<Node, RegistryError> {
        let node = self.set_subnode_owner(tx, parent, label, owner)?;
        self.write_resolver_and_ttl(tx, &node, resolver, ttl)?;
        Ok(node)
    }

    /// Approve or revoke `operator` for every node of the caller.
    pub fn set_approval_for_all(
        &self,
        tx: &mut Transaction<'_>,
        operator: &Address,
        approved: bool,
    ) -> Result<(), RegistryError> {
        let owner = tx.caller();
        let key = operator_key(&owner, operator);
        if approved {
            tx.put_raw(key, Vec::new());
        } else {
            tx.delete(key);
        }
        tx.emit(Event::ApprovalForAll {
            owner,
            operator: *operator,
            approved,
        });
        Ok(())
    }

    fn write_owner(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        owner: &Address,
    ) -> Result<(), RegistryError> {
        let mut record = self.record(tx, node)?;
        record.owner = *owner;
        tx.put(node_key(node), &record)?;
        tx.emit(Event::Transfer {
            node: *node,
            owner: *owner,
        });
        Ok(())
    }

    /// Events fire only for attributes that actually change.
    fn write_resolver_and_ttl(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        resolver: Option<Address>,
        ttl: Ttl,
    ) -> Result<(), RegistryError> {
        let mut record = self.record(tx, node)?;
        let resolver_changed = record.resolver != resolver;
        let ttl_changed = record.ttl != ttl;
        if !resolver_changed && !ttl_changed {
            return Ok(());
        }
        record.resolver = resolver;
        record.ttl = ttl;
        tx.put(node_key(node), &record)?;
        if resolver_changed {
            tx.emit(Event::NewResolver {
                node: *node,
                resolver,
            });
        }
        if ttl_changed {
            tx.emit(Event::NewTtl { node: *node, ttl });
        }
        Ok(())
    }
}
