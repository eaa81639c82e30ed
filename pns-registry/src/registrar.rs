//! Expiry-based ownership of labels under the base node.

use pns_storage::keys::{controller_key, label_key};
use pns_types::event::Event;
use pns_types::primitives::*;
use pns_types::record::Registration;

use crate::error::RegistryError;
use crate::ownable::Ownable;
use crate::registry::NodeRegistry;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseRegistrar {
    pub address: Address,
    pub registry: NodeRegistry,
    /// `namehash(tld)`.
    pub base_node: Node,
    /// Seconds after expiry during which only renewal is possible.
    pub grace_period: u64,
}

impl BaseRegistrar {
    pub fn new(
        address: Address,
        registry: NodeRegistry,
        base_node: Node,
        grace_period: u64,
    ) -> Self {
        Self {
            address,
            registry,
            base_node,
            grace_period,
        }
    }

    pub fn ownable(&self) -> Ownable {
        Ownable::new(self.address)
    }

    // ─── Controllers ────────────────────────────────────────────────────────

    pub fn add_controller(
        &self,
        tx: &mut Transaction<'_>,
        controller: &Address,
    ) -> Result<(), RegistryError> {
        self.ownable().require_owner(tx)?;
        tx.put_raw(controller_key(controller), Vec::new());
        tx.emit(Event::ControllerAdded {
            controller: *controller,
        });
        Ok(())
    }

    pub fn remove_controller(
        &self,
        tx: &mut Transaction<'_>,
        controller: &Address,
    ) -> Result<(), RegistryError> {
        self.ownable().require_owner(tx)?;
        if !self.is_controller(tx, controller)? {
            tracing::warn!(
                controller = %address_to_hex(controller),
                "removing an address that is not a controller"
            );
        }
        tx.delete(controller_key(controller));
        tx.emit(Event::ControllerRemoved {
            controller: *controller,
        });
        Ok(())
    }

    pub fn is_controller(
        &self,
        tx: &Transaction<'_>,
        who: &Address,
    ) -> Result<bool, RegistryError> {
        tx.exists(&controller_key(who))
    }

    fn require_controller(&self, tx: &Transaction<'_>) -> Result<(), RegistryError> {
        let caller = tx.caller();
        if !self.is_controller(tx, &caller)? {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&caller),
                reason: "is not a registrar controller".to_string(),
            });
        }
        Ok(())
    }

    /// The registrar can only mint names while it owns the base node.
    pub fn is_live(&self, tx: &Transaction<'_>) -> Result<bool, RegistryError> {
        Ok(self.registry.owner(tx, &self.base_node)? == self.address)
    }

    fn require_live(&self, tx: &Transaction<'_>) -> Result<(), RegistryError> {
        if !self.is_live(tx)? {
            return Err(RegistryError::NotLive);
        }
        Ok(())
    }

    // ─── Lookups ────────────────────────────────────────────────────────────

    pub fn registration(
        &self,
        tx: &Transaction<'_>,
        label: &LabelHash,
    ) -> Result<Option<Registration>, RegistryError> {
        tx.get(&label_key(label))
    }

    /// Expiry of a label, if it was ever registered.
    pub fn name_expires(
        &self,
        tx: &Transaction<'_>,
        label: &LabelHash,
    ) -> Result<Option<Timestamp>, RegistryError> {
        Ok(self.registration(tx, label)?.map(|r| r.expires))
    }

    /// A label is available once it is past expiry plus the grace period.
    pub fn available(&self, tx: &Transaction<'_>, label: &LabelHash) -> Result<bool, RegistryError> {
        Ok(match self.registration(tx, label)? {
            Some(reg) => tx.now() > reg.expires.saturating_add(self.grace_period),
            None => true,
        })
    }

    /// Current holder of an unexpired registration.
    pub fn owner_of(&self, tx: &Transaction<'_>, label: &LabelHash) -> Result<Address, RegistryError> {
        match self.registration(tx, label)? {
            Some(reg) if !reg.is_expired(tx.now()) => Ok(reg.owner),
            _ => Err(RegistryError::NotFound {
                what: format!("registration of label {}", hash_to_hex(label)),
            }),
        }
    }

    fn require_holder(&self, tx: &Transaction<'_>, label: &LabelHash) -> Result<Address, RegistryError> {
        let holder = self.owner_of(tx, label)?;
        let caller = tx.caller();
        if caller != holder {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&caller),
                reason: format!("does not hold label {}", hash_to_hex(label)),
            });
        }
        Ok(holder)
    }

    // ─── Registration ───────────────────────────────────────────────────────

    /// Register `label` for `duration` seconds. Returns the expiry.
    pub fn register(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        owner: &Address,
        duration: u64,
    ) -> Result<Timestamp, RegistryError> {
        self.register_inner(tx, label, owner, duration, None)
    }

    /// Register `label` and point its node at `resolver` in the same step.
    pub fn register_with_resolver(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        owner: &Address,
        duration: u64,
        resolver: &Address,
    ) -> Result<Timestamp, RegistryError> {
        self.register_inner(tx, label, owner, duration, Some(*resolver))
    }

    fn register_inner(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        owner: &Address,
        duration: u64,
        resolver: Option<Address>,
    ) -> Result<Timestamp, RegistryError> {
        self.require_live(tx)?;
        self.require_controller(tx)?;
        if !self.available(tx, label)? {
            return Err(RegistryError::NameUnavailable {
                name: hash_to_hex(label),
            });
        }
        let expires = self.expiry_after(tx.now(), duration)?;

        tx.put(
            label_key(label),
            &Registration {
                owner: *owner,
                expires,
            },
        )?;
        let (registry, base_node) = (self.registry, self.base_node);
        tx.call_as(self.address, |tx| match resolver {
            Some(_) => registry.set_subnode_record(tx, &base_node, label, owner, resolver, 0),
            None => registry.set_subnode_owner(tx, &base_node, label, owner),
        })?;
        tx.emit(Event::LabelRegistered {
            label: *label,
            owner: *owner,
            expires,
        });
        Ok(expires)
    }

    /// Extend a registration that is unexpired or within its grace period.
    pub fn renew(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        duration: u64,
    ) -> Result<Timestamp, RegistryError> {
        self.require_live(tx)?;
        self.require_controller(tx)?;
        let mut reg = match self.registration(tx, label)? {
            Some(reg) if reg.expires.saturating_add(self.grace_period) >= tx.now() => reg,
            _ => {
                return Err(RegistryError::NotFound {
                    what: format!("renewable registration of label {}", hash_to_hex(label)),
                })
            }
        };
        reg.expires = self.expiry_after(reg.expires, duration)?;
        tx.put(label_key(label), &reg)?;
        tx.emit(Event::LabelRenewed {
            label: *label,
            expires: reg.expires,
        });
        Ok(reg.expires)
    }

    fn expiry_after(&self, start: Timestamp, duration: u64) -> Result<Timestamp, RegistryError> {
        if duration == 0 {
            return Err(RegistryError::InvalidDuration {
                reason: "duration must be positive".to_string(),
            });
        }
        start
            .checked_add(duration)
            .filter(|expires| expires.checked_add(self.grace_period).is_some())
            .ok_or_else(|| RegistryError::InvalidDuration {
                reason: format!("expiry overflows: {} + {}", start, duration),
            })
    }

    // ─── Holder operations ──────────────────────────────────────────────────

    /// Re-sync the registry owner of the label's node (holder only).
    pub fn reclaim(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        owner: &Address,
    ) -> Result<(), RegistryError> {
        self.require_live(tx)?;
        self.require_holder(tx, label)?;
        let (registry, base_node) = (self.registry, self.base_node);
        tx.call_as(self.address, |tx| {
            registry.set_subnode_owner(tx, &base_node, label, owner)
        })?;
        Ok(())
    }

    /// Hand the registration and the node to `to` (holder only).
    pub fn transfer(
        &self,
        tx: &mut Transaction<'_>,
        label: &LabelHash,
        to: &Address,
    ) -> Result<(), RegistryError> {
        self.require_live(tx)?;
        let from = self.require_holder(tx, label)?;
        if *to == ZERO_ADDRESS {
            return Err(RegistryError::InvalidParams {
                reason: "cannot transfer to the zero address".to_string(),
            });
        }
        let mut reg = self.registration(tx, label)?.ok_or_else(|| RegistryError::NotFound {
            what: format!("registration of label {}", hash_to_hex(label)),
        })?;
        reg.owner = *to;
        tx.put(label_key(label), &reg)?;
        let (registry, base_node) = (self.registry, self.base_node);
        tx.call_as(self.address, |tx| {
            registry.set_subnode_owner(tx, &base_node, label, to)
        })?;
        tx.emit(Event::LabelTransferred {
            label: *label,
            from,
            to: *to,
        });
        Ok(())
    }

    /// Point the base node at `resolver` (authority only).
    pub fn set_resolver(
        &self,
        tx: &mut Transaction<'_>,
        resolver: &Address,
    ) -> Result<(), RegistryError> {
        self.ownable().require_owner(tx)?;
        let (registry, base_node) = (self.registry, self.base_node);
        tx.call_as(self.address, |tx| {
            registry.set_resolver(tx, &base_node, Some(*resolver))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::CallContext;
    use pns_crypto::namehash::{label_hash, make_node, namehash};
    use pns_storage::memory::MemoryStore;
    use pns_storage::traits::BatchWriter;

    const REGISTRY: Address = [0xE0u8; 20];
    const REGISTRAR: Address = [0xE1u8; 20];
    const ADMIN: Address = [1u8; 20];
    const CONTROLLER: Address = [2u8; 20];
    const ALICE: Address = [3u8; 20];
    const BOB: Address = [4u8; 20];
    const RESOLVER: Address = [5u8; 20];
    const GRACE: u64 = 100;

    fn setup(store: &MemoryStore, now: Timestamp) -> (BaseRegistrar, Transaction<'_>) {
        let registry = NodeRegistry::new(REGISTRY);
        let registrar = BaseRegistrar::new(REGISTRAR, registry, namehash("push"), GRACE);
        let mut tx = Transaction::new(store, CallContext::new(ADMIN, now));
        registry.init_root(&mut tx, &ADMIN).unwrap();
        registrar.ownable().init(&mut tx, &ADMIN).unwrap();
        registry
            .set_subnode_owner(&mut tx, &ROOT_NODE, &label_hash("push"), &REGISTRAR)
            .unwrap();
        registrar.add_controller(&mut tx, &CONTROLLER).unwrap();
        (registrar, tx)
    }

    fn register(
        registrar: &BaseRegistrar,
        tx: &mut Transaction<'_>,
        label: &str,
        owner: &Address,
        duration: u64,
    ) -> Result<Timestamp, RegistryError> {
        tx.call_as(CONTROLLER, |tx| {
            registrar.register(tx, &label_hash(label), owner, duration)
        })
    }

    #[test]
    fn test_controller_management() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        assert!(registrar.is_controller(&tx, &CONTROLLER).unwrap());

        let err = tx
            .call_as(ALICE, |tx| registrar.add_controller(tx, &ALICE))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));

        registrar.remove_controller(&mut tx, &CONTROLLER).unwrap();
        assert!(!registrar.is_controller(&tx, &CONTROLLER).unwrap());
    }

    #[test]
    fn test_register_sets_registry_owner() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        let expires = register(&registrar, &mut tx, "tess", &ALICE, 500).unwrap();
        assert_eq!(expires, 1500);

        let lh = label_hash("tess");
        assert_eq!(registrar.owner_of(&tx, &lh).unwrap(), ALICE);
        assert_eq!(registrar.name_expires(&tx, &lh).unwrap(), Some(1500));
        assert!(!registrar.available(&tx, &lh).unwrap());
        let node = make_node(&namehash("push"), &lh);
        assert_eq!(registrar.registry.owner(&tx, &node).unwrap(), ALICE);
        assert_eq!(node, namehash("tess.push"));
    }

    #[test]
    fn test_register_with_resolver() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        let lh = label_hash("tess");
        tx.call_as(CONTROLLER, |tx| {
            registrar.register_with_resolver(tx, &lh, &ALICE, 500, &RESOLVER)
        })
        .unwrap();
        assert_eq!(
            registrar
                .registry
                .resolver(&tx, &namehash("tess.push"))
                .unwrap(),
            Some(RESOLVER)
        );
    }

    #[test]
    fn test_only_controllers_register() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        let err = tx
            .call_as(ALICE, |tx| {
                registrar.register(tx, &label_hash("tess"), &ALICE, 500)
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
    }

    #[test]
    fn test_taken_name_unavailable_until_grace_ends() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        register(&registrar, &mut tx, "tess", &ALICE, 500).unwrap();
        assert!(matches!(
            register(&registrar, &mut tx, "tess", &BOB, 500),
            Err(RegistryError::NameUnavailable { .. })
        ));

        // Expired at 1500 but still in grace until 1600.
        let (ops, _) = tx.into_parts();
        store.write_batch(ops).unwrap();
        let tx = Transaction::new(&store, CallContext::new(ADMIN, 1600));
        assert!(!registrar.available(&tx, &label_hash("tess")).unwrap());
        assert!(registrar.owner_of(&tx, &label_hash("tess")).is_err());

        let mut tx_later = Transaction::new(&store, CallContext::new(ADMIN, 1601));
        assert!(registrar.available(&tx_later, &label_hash("tess")).unwrap());
        register(&registrar, &mut tx_later, "tess", &BOB, 500).unwrap();
        assert_eq!(
            registrar.owner_of(&tx_later, &label_hash("tess")).unwrap(),
            BOB
        );
    }

    #[test]
    fn test_invalid_durations() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        assert!(matches!(
            register(&registrar, &mut tx, "tess", &ALICE, 0),
            Err(RegistryError::InvalidDuration { .. })
        ));
        assert!(matches!(
            register(&registrar, &mut tx, "tess", &ALICE, u64::MAX),
            Err(RegistryError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_not_live_without_base_node() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        // Root owner takes the base node back from the registrar.
        registrar
            .registry
            .set_subnode_owner(&mut tx, &ROOT_NODE, &label_hash("push"), &ADMIN)
            .unwrap();
        assert!(matches!(
            register(&registrar, &mut tx, "tess", &ALICE, 500),
            Err(RegistryError::NotLive)
        ));
    }

    #[test]
    fn test_renew_within_grace() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        register(&registrar, &mut tx, "tess", &ALICE, 500).unwrap();
        let lh = label_hash("tess");

        let expires = tx
            .call_as(CONTROLLER, |tx| registrar.renew(tx, &lh, 100))
            .unwrap();
        assert_eq!(expires, 1600);

        let (ops, _) = tx.into_parts();
        store.write_batch(ops).unwrap();

        // Inside the grace period: renewable.
        let mut tx = Transaction::new(&store, CallContext::new(ADMIN, 1700));
        assert_eq!(
            tx.call_as(CONTROLLER, |tx| registrar.renew(tx, &lh, 100))
                .unwrap(),
            1700
        );

        // Past the grace period: gone.
        let mut tx = Transaction::new(&store, CallContext::new(ADMIN, 1701));
        assert!(matches!(
            tx.call_as(CONTROLLER, |tx| registrar.renew(tx, &lh, 100)),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_transfer_and_reclaim() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        register(&registrar, &mut tx, "tess", &ALICE, 500).unwrap();
        let lh = label_hash("tess");
        let node = namehash("tess.push");

        // Alice hands the registry node to Bob but keeps the registration.
        tx.call_as(ALICE, |tx| registrar.registry.set_owner(tx, &node, &BOB))
            .unwrap();
        tx.call_as(ALICE, |tx| registrar.reclaim(tx, &lh, &ALICE))
            .unwrap();
        assert_eq!(registrar.registry.owner(&tx, &node).unwrap(), ALICE);

        assert!(tx
            .call_as(BOB, |tx| registrar.transfer(tx, &lh, &BOB))
            .is_err());
        tx.call_as(ALICE, |tx| registrar.transfer(tx, &lh, &BOB))
            .unwrap();
        assert_eq!(registrar.owner_of(&tx, &lh).unwrap(), BOB);
        assert_eq!(registrar.registry.owner(&tx, &node).unwrap(), BOB);
    }

    #[test]
    fn test_set_base_resolver() {
        let store = MemoryStore::new();
        let (registrar, mut tx) = setup(&store, 1000);
        registrar.set_resolver(&mut tx, &RESOLVER).unwrap();
        assert_eq!(
            registrar
                .registry
                .resolver(&tx, &namehash("push"))
                .unwrap(),
            Some(RESOLVER)
        );
    }
}
