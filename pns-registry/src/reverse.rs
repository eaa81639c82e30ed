//! Reverse records under `addr.reverse`.

use pns_crypto::namehash::{label_hash, reverse_label, reverse_node};
use pns_storage::keys::{meta, meta_key_for};
use pns_types::event::Event;
use pns_types::primitives::*;

use crate::error::RegistryError;
use crate::ownable::Ownable;
use crate::registry::NodeRegistry;
use crate::resolver::Resolver;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseRegistrar {
    pub address: Address,
    pub registry: NodeRegistry,
    /// Resolver that receives names written through [`set_name`](Self::set_name).
    pub resolver: Resolver,
    /// `namehash("addr.reverse")`.
    pub reverse_node: Node,
}

impl ReverseRegistrar {
    pub fn new(
        address: Address,
        registry: NodeRegistry,
        resolver: Resolver,
        reverse_node: Node,
    ) -> Self {
        Self {
            address,
            registry,
            resolver,
            reverse_node,
        }
    }

    pub fn ownable(&self) -> Ownable {
        Ownable::new(self.address)
    }

    /// Reverse node of an address.
    pub fn node(&self, addr: &Address) -> Node {
        reverse_node(addr)
    }

    pub fn default_resolver(&self, tx: &Transaction<'_>) -> Result<Option<Address>, RegistryError> {
        tx.get(&meta_key_for(meta::DEFAULT_RESOLVER, &self.address))
    }

    pub fn set_default_resolver(
        &self,
        tx: &mut Transaction<'_>,
        resolver: &Address,
    ) -> Result<(), RegistryError> {
        self.ownable().require_owner(tx)?;
        tx.put(meta_key_for(meta::DEFAULT_RESOLVER, &self.address), resolver)?;
        tx.emit(Event::DefaultResolverChanged {
            resolver: *resolver,
        });
        Ok(())
    }

    /// Claim the reverse node of `addr` for the caller, pointing it at the
    /// default resolver.
    pub fn claim(&self, tx: &mut Transaction<'_>, addr: &Address) -> Result<Node, RegistryError> {
        let resolver = self.default_resolver(tx)?;
        self.claim_with_resolver(tx, addr, resolver)
    }

    /// Claim the reverse node of `addr` for the caller. With no resolver
    /// given, the node keeps its current one.
    pub fn claim_with_resolver(
        &self,
        tx: &mut Transaction<'_>,
        addr: &Address,
        resolver: Option<Address>,
    ) -> Result<Node, RegistryError> {
        let caller = tx.caller();
        if !self.may_claim_for(tx, addr, &caller)? {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&caller),
                reason: format!("may not claim the reverse record of {}", address_to_hex(addr)),
            });
        }
        self.claim_for(tx, addr, &caller, resolver)
    }

    /// Claim the caller's reverse node on behalf of this registrar and set its
    /// name in the default resolver.
    pub fn set_name(&self, tx: &mut Transaction<'_>, name: &str) -> Result<Node, RegistryError> {
        let resolver = self
            .default_resolver(tx)?
            .ok_or(RegistryError::ResolverRequired)?;
        if resolver != self.resolver.address {
            return Err(RegistryError::InvalidParams {
                reason: format!(
                    "default resolver {} is not the public resolver",
                    address_to_hex(&resolver)
                ),
            });
        }
        let addr = tx.caller();
        let node = self.claim_for(tx, &addr, &self.address, Some(resolver))?;
        let public = self.resolver;
        tx.call_as(self.address, |tx| public.set_name(tx, &node, name))?;
        Ok(node)
    }

    fn may_claim_for(
        &self,
        tx: &Transaction<'_>,
        addr: &Address,
        caller: &Address,
    ) -> Result<bool, RegistryError> {
        Ok(caller == addr
            || self.registry.is_approved_for_all(tx, addr, caller)?
            || self.ownable().is_owner(tx, caller)?)
    }

    fn claim_for(
        &self,
        tx: &mut Transaction<'_>,
        addr: &Address,
        owner: &Address,
        resolver: Option<Address>,
    ) -> Result<Node, RegistryError> {
        let label = label_hash(&reverse_label(addr));
        let node = self.node(addr);
        let resolver = match resolver {
            Some(r) => Some(r),
            None => self.registry.resolver(tx, &node)?,
        };
        let (registry, parent) = (self.registry, self.reverse_node);
        tx.call_as(self.address, |tx| {
            registry.set_subnode_record(tx, &parent, &label, owner, resolver, 0)
        })?;
        tx.emit(Event::ReverseClaimed { addr: *addr, node });
        Ok(node)
    }
}
