//! Commit-reveal registration.
//!
//! A caller first commits `make_commitment(...)`, waits at least
//! `min_commitment_age`, then reveals the parameters through
//! [`RegistrarController::register`] before `max_commitment_age` elapses.

use serde::Serialize;

use pns_crypto::namehash::{label_hash, make_node};
use pns_storage::keys::{commitment_key, meta, meta_key_for};
use pns_types::constants::MAX_INITIAL_RECORDS;
use pns_types::event::Event;
use pns_types::name::{label_length, validate_label};
use pns_types::primitives::*;
use pns_types::record::ResolverRecord;

use crate::commitment::{is_stale, make_commitment, validate_commitment_age};
use crate::error::RegistryError;
use crate::ownable::Ownable;
use crate::price::PriceOracle;
use crate::registrar::BaseRegistrar;
use crate::resolver::Resolver;
use crate::transaction::Transaction;

/// The parameters a registration commits to and later reveals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub label: String,
    pub owner: Address,
    pub duration: u64,
    pub secret: Secret,
    pub resolver: Option<Address>,
    pub records: Vec<ResolverRecord>,
}

impl RegistrationRequest {
    pub fn commitment(&self) -> Result<CommitmentHash, RegistryError> {
        make_commitment(
            &label_hash(&self.label),
            &self.owner,
            self.duration,
            &self.secret,
            self.resolver,
            &self.records,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationReceipt {
    pub name: String,
    #[serde(with = "hex_bytes")]
    pub node: Node,
    #[serde(with = "hex_bytes")]
    pub label_hash: LabelHash,
    pub expires: Timestamp,
    pub cost: Amount,
    pub refund: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalReceipt {
    pub name: String,
    pub expires: Timestamp,
    pub cost: Amount,
    pub refund: Amount,
}

mod hex_bytes {
    pub fn serialize<S: serde::Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&pns_types::primitives::hash_to_hex(bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarController {
    pub address: Address,
    pub registrar: BaseRegistrar,
    pub resolver: Resolver,
    pub prices: PriceOracle,
    pub tld: String,
    pub min_commitment_age: u64,
    pub max_commitment_age: u64,
    pub min_registration_duration: u64,
}

impl RegistrarController {
    pub fn ownable(&self) -> Ownable {
        Ownable::new(self.address)
    }

    fn full_name(&self, label: &str) -> String {
        format!("{}.{}", label, self.tld)
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Label syntax check.
    pub fn valid(&self, label: &str) -> bool {
        validate_label(label).is_ok()
    }

    pub fn available(&self, tx: &Transaction<'_>, label: &str) -> Result<bool, RegistryError> {
        Ok(self.valid(label) && self.registrar.available(tx, &label_hash(label))?)
    }

    pub fn rent_price(&self, label: &str, duration: u64) -> Result<Amount, RegistryError> {
        self.prices.rent(label_length(label), duration)
    }

    /// Submission time of a pending commitment.
    pub fn commitment_time(
        &self,
        tx: &Transaction<'_>,
        commitment: &CommitmentHash,
    ) -> Result<Option<Timestamp>, RegistryError> {
        tx.get(&commitment_key(commitment))
    }

    /// Payments collected and not yet withdrawn.
    pub fn balance(&self, tx: &Transaction<'_>) -> Result<Amount, RegistryError> {
        Ok(tx
            .get(&meta_key_for(meta::BALANCE, &self.address))?
            .unwrap_or(0))
    }

    // ─── Commit ─────────────────────────────────────────────────────────────

    /// Record a commitment at the current time.
    ///
    /// A stale commitment with the same hash is refreshed; a fresh one is
    /// rejected.
    pub fn commit(
        &self,
        tx: &mut Transaction<'_>,
        commitment: &CommitmentHash,
    ) -> Result<(), RegistryError> {
        let now = tx.now();
        if let Some(committed_at) = self.commitment_time(tx, commitment)? {
            if !is_stale(committed_at, now, self.max_commitment_age) {
                return Err(RegistryError::UnexpiredCommitmentExists {
                    commitment: hash_to_hex(commitment),
                });
            }
        }
        tx.put(commitment_key(commitment), &now)?;
        tx.emit(Event::CommitmentRecorded {
            commitment: *commitment,
            timestamp: now,
        });
        Ok(())
    }

    // ─── Reveal ─────────────────────────────────────────────────────────────

    pub fn register(
        &self,
        tx: &mut Transaction<'_>,
        request: &RegistrationRequest,
        payment: Amount,
    ) -> Result<RegistrationReceipt, RegistryError> {
        let commitment = request.commitment()?;
        let committed_at = self.commitment_time(tx, &commitment)?.ok_or_else(|| {
            RegistryError::UnknownCommitment {
                commitment: hash_to_hex(&commitment),
            }
        })?;
        validate_commitment_age(
            committed_at,
            tx.now(),
            self.min_commitment_age,
            self.max_commitment_age,
        )?;

        validate_label(&request.label)?;
        if request.duration < self.min_registration_duration {
            return Err(RegistryError::InvalidDuration {
                reason: format!(
                    "{}s is below the minimum of {}s",
                    request.duration, self.min_registration_duration
                ),
            });
        }
        let label = label_hash(&request.label);
        if !self.registrar.available(tx, &label)? {
            return Err(RegistryError::NameUnavailable {
                name: self.full_name(&request.label),
            });
        }

        let cost = self.rent_price(&request.label, request.duration)?;
        if payment < cost {
            return Err(RegistryError::InsufficientPayment {
                required: cost,
                paid: payment,
            });
        }
        self.check_initial_records(request)?;
        // Records left by a lapsed holder must not resolve for the new one.
        let inherits_records = match self.registrar.registration(tx, &label)? {
            Some(previous) if previous.owner != request.owner => {
                let node = make_node(&self.registrar.base_node, &label);
                !self.resolver.records(tx, &node)?.is_empty()
            }
            _ => false,
        };

        let registrar = self.registrar;
        let expires = tx.call_as(self.address, |tx| match request.resolver {
            Some(resolver) => registrar.register_with_resolver(
                tx,
                &label,
                &request.owner,
                request.duration,
                &resolver,
            ),
            None => registrar.register(tx, &label, &request.owner, request.duration),
        })?;

        let node = make_node(&registrar.base_node, &label);
        if inherits_records || !request.records.is_empty() {
            let resolver = self.resolver;
            let controller = self.address;
            tx.while_registering(node, |tx| {
                tx.call_as(controller, |tx| {
                    if inherits_records {
                        resolver.clear_records(tx, &node)?;
                    }
                    for record in &request.records {
                        resolver.set_record(tx, &node, record.clone())?;
                    }
                    Ok(())
                })
            })?;
        }

        tx.delete(commitment_key(&commitment));
        self.credit(tx, cost)?;

        let name = self.full_name(&request.label);
        tx.emit(Event::NameRegistered {
            name: name.clone(),
            label,
            owner: request.owner,
            cost,
            expires,
        });
        Ok(RegistrationReceipt {
            name,
            node,
            label_hash: label,
            expires,
            cost,
            refund: payment - cost,
        })
    }

    fn check_initial_records(&self, request: &RegistrationRequest) -> Result<(), RegistryError> {
        if request.records.is_empty() {
            return Ok(());
        }
        if request.resolver != Some(self.resolver.address) {
            return Err(RegistryError::ResolverRequired);
        }
        if request.records.len() > MAX_INITIAL_RECORDS {
            return Err(RegistryError::InvalidRecord {
                reason: format!(
                    "{} initial records exceed the limit of {}",
                    request.records.len(),
                    MAX_INITIAL_RECORDS
                ),
            });
        }
        for record in &request.records {
            record.validate()?;
        }
        Ok(())
    }

    // ─── Renewal & payments ─────────────────────────────────────────────────

    /// Extend a registration; anyone may pay.
    pub fn renew(
        &self,
        tx: &mut Transaction<'_>,
        label: &str,
        duration: u64,
        payment: Amount,
    ) -> Result<RenewalReceipt, RegistryError> {
        validate_label(label)?;
        let cost = self.rent_price(label, duration)?;
        if payment < cost {
            return Err(RegistryError::InsufficientPayment {
                required: cost,
                paid: payment,
            });
        }
        let registrar = self.registrar;
        let lh = label_hash(label);
        let expires = tx.call_as(self.address, |tx| registrar.renew(tx, &lh, duration))?;
        self.credit(tx, cost)?;

        let name = self.full_name(label);
        tx.emit(Event::NameRenewed {
            name: name.clone(),
            label: lh,
            cost,
            expires,
        });
        Ok(RenewalReceipt {
            name,
            expires,
            cost,
            refund: payment - cost,
        })
    }

    fn credit(&self, tx: &mut Transaction<'_>, amount: Amount) -> Result<(), RegistryError> {
        let balance = self
            .balance(tx)?
            .checked_add(amount)
            .ok_or(RegistryError::Overflow {
                what: "controller balance",
            })?;
        tx.put(meta_key_for(meta::BALANCE, &self.address), &balance)
    }

    /// Pay out the collected balance to the authority.
    pub fn withdraw(&self, tx: &mut Transaction<'_>) -> Result<Amount, RegistryError> {
        self.ownable().require_owner(tx)?;
        let amount = self.balance(tx)?;
        tx.delete(meta_key_for(meta::BALANCE, &self.address));
        tx.emit(Event::Withdrawn {
            to: tx.caller(),
            amount,
        });
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeRegistry;
    use crate::transaction::CallContext;
    use pns_crypto::namehash::namehash;
    use pns_storage::memory::MemoryStore;
    use pns_storage::traits::BatchWriter;
    use pns_types::constants::{DEFAULT_PRICE_TIERS, ONE_TOKEN, SECONDS_PER_YEAR};

    const REGISTRY: Address = [0xE0u8; 20];
    const REGISTRAR: Address = [0xE1u8; 20];
    const CONTROLLER: Address = [0xE2u8; 20];
    const RESOLVER: Address = [0xE3u8; 20];
    const ADMIN: Address = [1u8; 20];
    const ALICE: Address = [2u8; 20];
    const BOB: Address = [3u8; 20];

    fn controller() -> RegistrarController {
        let registry = NodeRegistry::new(REGISTRY);
        let registrar = BaseRegistrar::new(REGISTRAR, registry, namehash("push"), 0);
        RegistrarController {
            address: CONTROLLER,
            registrar,
            resolver: Resolver::new(RESOLVER, registry, CONTROLLER),
            prices: PriceOracle::new(DEFAULT_PRICE_TIERS.to_vec()).unwrap(),
            tld: "push".to_string(),
            min_commitment_age: 60,
            max_commitment_age: 86_400,
            min_registration_duration: 28 * 86_400,
        }
    }

    /// Minimal wiring: root and base node, controller authorised.
    fn bootstrap(store: &MemoryStore, c: &RegistrarController) {
        let registry = c.registrar.registry;
        let mut tx = Transaction::new(store, CallContext::new(ADMIN, 0));
        registry.init_root(&mut tx, &ADMIN).unwrap();
        c.registrar.ownable().init(&mut tx, &ADMIN).unwrap();
        c.ownable().init(&mut tx, &ADMIN).unwrap();
        registry
            .set_subnode_owner(&mut tx, &ROOT_NODE, &label_hash("push"), &REGISTRAR)
            .unwrap();
        c.registrar.add_controller(&mut tx, &CONTROLLER).unwrap();
        let (ops, _) = tx.into_parts();
        store.write_batch(ops).unwrap();
    }

    fn run<T>(
        store: &MemoryStore,
        sender: Address,
        now: Timestamp,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut tx = Transaction::new(store, CallContext::new(sender, now));
        let value = f(&mut tx)?;
        let (ops, _) = tx.into_parts();
        store.write_batch(ops).unwrap();
        Ok(value)
    }

    fn tess_request(secret: Secret) -> RegistrationRequest {
        RegistrationRequest {
            label: "tess".to_string(),
            owner: ALICE,
            duration: SECONDS_PER_YEAR,
            secret,
            resolver: None,
            records: Vec::new(),
        }
    }

    #[test]
    fn test_tess_scenario() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let request = tess_request([7u8; 32]);
        let price = c.rent_price("tess", SECONDS_PER_YEAR).unwrap();
        assert_eq!(price, 36 * ONE_TOKEN + ONE_TOKEN / 2);

        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();
        let receipt = run(&store, ALICE, 1_070, |tx| c.register(tx, &request, price)).unwrap();

        assert_eq!(receipt.refund, 0);
        assert_eq!(receipt.cost, price);
        assert_eq!(receipt.expires, 1_070 + SECONDS_PER_YEAR);
        assert_eq!(receipt.node, namehash("tess.push"));
        assert_eq!(receipt.name, "tess.push");

        let tx = Transaction::new(&store, CallContext::new(ALICE, 1_071));
        assert!(!c.available(&tx, "tess").unwrap());
        assert_eq!(
            c.registrar.owner_of(&tx, &label_hash("tess")).unwrap(),
            ALICE
        );
        assert_eq!(c.balance(&tx).unwrap(), price);
        // The commitment is consumed.
        assert_eq!(
            c.commitment_time(&tx, &request.commitment().unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn test_wrong_secret_is_unknown_commitment() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let committed = tess_request([1u8; 32]);
        let revealed = tess_request([2u8; 32]);

        run(&store, ALICE, 1_000, |tx| c.commit(tx, &committed.commitment()?)).unwrap();
        let err = run(&store, ALICE, 1_070, |tx| {
            c.register(tx, &revealed, 100 * ONE_TOKEN)
        })
        .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCommitment { .. }));
    }

    #[test]
    fn test_reveal_window() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let request = tess_request([1u8; 32]);
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();

        let too_new = run(&store, ALICE, 1_059, |tx| {
            c.register(tx, &request, 100 * ONE_TOKEN)
        });
        assert!(matches!(too_new, Err(RegistryError::CommitmentTooNew { .. })));

        let too_old = run(&store, ALICE, 1_000 + 86_401, |tx| {
            c.register(tx, &request, 100 * ONE_TOKEN)
        });
        assert!(matches!(too_old, Err(RegistryError::CommitmentTooOld { .. })));
    }

    #[test]
    fn test_duplicate_commit() {
        let store = MemoryStore::new();
        let c = controller();
        let hash = [9u8; 32];
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &hash)).unwrap();
        assert!(matches!(
            run(&store, BOB, 2_000, |tx| c.commit(tx, &hash)),
            Err(RegistryError::UnexpiredCommitmentExists { .. })
        ));

        // A stale commitment is refreshed.
        run(&store, BOB, 1_000 + 86_401, |tx| c.commit(tx, &hash)).unwrap();
        let tx = Transaction::new(&store, CallContext::new(BOB, 0));
        assert_eq!(c.commitment_time(&tx, &hash).unwrap(), Some(1_000 + 86_401));
    }

    #[test]
    fn test_failed_reveal_changes_nothing() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let request = tess_request([1u8; 32]);
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();

        let err = run(&store, ALICE, 1_070, |tx| c.register(tx, &request, 1)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InsufficientPayment { paid: 1, .. }
        ));

        let tx = Transaction::new(&store, CallContext::new(ALICE, 1_070));
        assert!(c.available(&tx, "tess").unwrap());
        assert_eq!(
            c.commitment_time(&tx, &request.commitment().unwrap()).unwrap(),
            Some(1_000)
        );
        assert_eq!(c.balance(&tx).unwrap(), 0);
    }

    #[test]
    fn test_short_duration_and_bad_label() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);

        let mut short = tess_request([1u8; 32]);
        short.duration = 86_400;
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &short.commitment()?)).unwrap();
        assert!(matches!(
            run(&store, ALICE, 1_070, |tx| c.register(tx, &short, ONE_TOKEN)),
            Err(RegistryError::InvalidDuration { .. })
        ));

        let mut bad = tess_request([2u8; 32]);
        bad.label = "Tess".to_string();
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &bad.commitment()?)).unwrap();
        assert!(matches!(
            run(&store, ALICE, 1_070, |tx| c.register(tx, &bad, 100 * ONE_TOKEN)),
            Err(RegistryError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_initial_records_installed() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let mut request = tess_request([1u8; 32]);
        request.resolver = Some(RESOLVER);
        request.records = vec![
            ResolverRecord::Addr(ALICE),
            ResolverRecord::Text {
                key: "url".to_string(),
                value: "https://tess.example".to_string(),
            },
        ];
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();
        let receipt = run(&store, ALICE, 1_070, |tx| {
            c.register(tx, &request, 100 * ONE_TOKEN)
        })
        .unwrap();
        assert_eq!(receipt.refund, 100 * ONE_TOKEN - receipt.cost);

        let tx = Transaction::new(&store, CallContext::new(ALICE, 1_071));
        let node = namehash("tess.push");
        assert_eq!(c.resolver.addr(&tx, &node).unwrap(), Some(ALICE));
        assert_eq!(
            c.resolver.text(&tx, &node, "url").unwrap(),
            Some("https://tess.example".to_string())
        );
        assert_eq!(
            c.registrar.registry.resolver(&tx, &node).unwrap(),
            Some(RESOLVER)
        );
    }

    #[test]
    fn test_records_need_public_resolver() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let mut request = tess_request([1u8; 32]);
        request.records = vec![ResolverRecord::Addr(ALICE)];
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();
        assert!(matches!(
            run(&store, ALICE, 1_070, |tx| c.register(tx, &request, 100 * ONE_TOKEN)),
            Err(RegistryError::ResolverRequired)
        ));
    }

    #[test]
    fn test_taken_name_unavailable() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let first = tess_request([1u8; 32]);
        let mut second = tess_request([2u8; 32]);
        second.owner = BOB;
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &first.commitment()?)).unwrap();
        run(&store, BOB, 1_000, |tx| c.commit(tx, &second.commitment()?)).unwrap();

        run(&store, ALICE, 1_070, |tx| c.register(tx, &first, 100 * ONE_TOKEN)).unwrap();
        assert!(matches!(
            run(&store, BOB, 1_080, |tx| c.register(tx, &second, 100 * ONE_TOKEN)),
            Err(RegistryError::NameUnavailable { .. })
        ));
    }

    #[test]
    fn test_renew_and_withdraw() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let request = tess_request([1u8; 32]);
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &request.commitment()?)).unwrap();
        let receipt = run(&store, ALICE, 1_070, |tx| {
            c.register(tx, &request, 100 * ONE_TOKEN)
        })
        .unwrap();

        let renewal = run(&store, BOB, 2_000, |tx| {
            c.renew(tx, "tess", SECONDS_PER_YEAR, 100 * ONE_TOKEN)
        })
        .unwrap();
        assert_eq!(renewal.expires, receipt.expires + SECONDS_PER_YEAR);
        assert_eq!(renewal.cost, receipt.cost);

        assert!(run(&store, ALICE, 2_000, |tx| c.withdraw(tx)).is_err());
        let paid = run(&store, ADMIN, 2_000, |tx| c.withdraw(tx)).unwrap();
        assert_eq!(paid, receipt.cost + renewal.cost);
        assert_eq!(run(&store, ADMIN, 2_001, |tx| c.withdraw(tx)).unwrap(), 0);
    }

    #[test]
    fn test_available_and_valid() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let tx = Transaction::new(&store, CallContext::new(ALICE, 0));
        assert!(c.valid("tess"));
        assert!(!c.valid("-tess"));
        assert!(c.available(&tx, "tess").unwrap());
        assert!(!c.available(&tx, "Tess").unwrap());
    }

    #[test]
    fn test_lapsed_name_drops_previous_records() {
        let store = MemoryStore::new();
        let c = controller();
        bootstrap(&store, &c);
        let mut first = tess_request([1u8; 32]);
        first.resolver = Some(RESOLVER);
        first.records = vec![ResolverRecord::Addr(ALICE)];
        run(&store, ALICE, 1_000, |tx| c.commit(tx, &first.commitment()?)).unwrap();
        let receipt = run(&store, ALICE, 1_070, |tx| c.register(tx, &first, 100 * ONE_TOKEN)).unwrap();

        let mut second = tess_request([2u8; 32]);
        second.owner = BOB;
        let lapsed = receipt.expires + 10;
        run(&store, BOB, lapsed, |tx| c.commit(tx, &second.commitment()?)).unwrap();
        run(&store, BOB, lapsed + 70, |tx| c.register(tx, &second, 100 * ONE_TOKEN)).unwrap();

        let tx = Transaction::new(&store, CallContext::new(BOB, lapsed + 71));
        let node = namehash("tess.push");
        assert_eq!(c.registrar.registry.owner(&tx, &node).unwrap(), BOB);
        assert_eq!(c.resolver.addr(&tx, &node).unwrap(), None);
        assert!(c.resolver.records(&tx, &node).unwrap().is_empty());
    }
}
