//! Public resolver: per-node address, name and text records.

use pns_storage::keys::record_key;
use pns_types::event::Event;
use pns_types::primitives::*;
use pns_types::record::{ResolverRecord, ResolverRecords};

use crate::error::RegistryError;
use crate::registry::NodeRegistry;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    pub address: Address,
    pub registry: NodeRegistry,
    /// Controller allowed to write the records of a node it is registering.
    pub trusted_controller: Address,
}

impl Resolver {
    pub fn new(address: Address, registry: NodeRegistry, trusted_controller: Address) -> Self {
        Self {
            address,
            registry,
            trusted_controller,
        }
    }

    /// Owner, approved operator, or the controller mid-registration of `node`.
    pub fn is_authorised(&self, tx: &Transaction<'_>, node: &Node) -> Result<bool, RegistryError> {
        let caller = tx.caller();
        if caller == self.trusted_controller && tx.registering() == Some(*node) {
            return Ok(true);
        }
        self.registry.is_authorised(tx, node, &caller)
    }

    fn require_authorised(&self, tx: &Transaction<'_>, node: &Node) -> Result<(), RegistryError> {
        if !self.is_authorised(tx, node)? {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&tx.caller()),
                reason: format!("may not edit records of node {}", hash_to_hex(node)),
            });
        }
        Ok(())
    }

    // ─── Getters ────────────────────────────────────────────────────────────

    pub fn records(
        &self,
        tx: &Transaction<'_>,
        node: &Node,
    ) -> Result<ResolverRecords, RegistryError> {
        Ok(tx.get(&record_key(node))?.unwrap_or_default())
    }

    pub fn addr(&self, tx: &Transaction<'_>, node: &Node) -> Result<Option<Address>, RegistryError> {
        Ok(self.records(tx, node)?.addr)
    }

    pub fn name(&self, tx: &Transaction<'_>, node: &Node) -> Result<Option<String>, RegistryError> {
        Ok(self.records(tx, node)?.name)
    }

    pub fn text(
        &self,
        tx: &Transaction<'_>,
        node: &Node,
        key: &str,
    ) -> Result<Option<String>, RegistryError> {
        Ok(self.records(tx, node)?.texts.remove(key))
    }

    // ─── Setters ────────────────────────────────────────────────────────────

    /// Apply one record to a node.
    pub fn set_record(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        record: ResolverRecord,
    ) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        record.validate()?;

        let event = match &record {
            ResolverRecord::Addr(addr) => Event::AddrChanged {
                node: *node,
                addr: *addr,
            },
            ResolverRecord::Name(name) => Event::NameChanged {
                node: *node,
                name: name.clone(),
            },
            ResolverRecord::Text { key, value } => Event::TextChanged {
                node: *node,
                key: key.clone(),
                value: value.clone(),
            },
        };

        let mut records = self.records(tx, node)?;
        records.apply(record);
        if records.is_empty() {
            tx.delete(record_key(node));
        } else {
            tx.put(record_key(node), &records)?;
        }
        tx.emit(event);
        Ok(())
    }

    pub fn set_addr(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        addr: &Address,
    ) -> Result<(), RegistryError> {
        self.set_record(tx, node, ResolverRecord::Addr(*addr))
    }

    pub fn set_name(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        name: &str,
    ) -> Result<(), RegistryError> {
        self.set_record(tx, node, ResolverRecord::Name(name.to_string()))
    }

    /// Set a text record; an empty value removes the key.
    pub fn set_text(
        &self,
        tx: &mut Transaction<'_>,
        node: &Node,
        key: &str,
        value: &str,
    ) -> Result<(), RegistryError> {
        self.set_record(
            tx,
            node,
            ResolverRecord::Text {
                key: key.to_string(),
                value: value.to_string(),
            },
        )
    }

    /// Drop every record of a node.
    pub fn clear_records(&self, tx: &mut Transaction<'_>, node: &Node) -> Result<(), RegistryError> {
        self.require_authorised(tx, node)?;
        tx.delete(record_key(node));
        tx.emit(Event::RecordsCleared { node: *node });
        Ok(())
    }
}
