//! Executor facade: runs one operation at a time against a store.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use pns_storage::name_store::NameStore;
use pns_storage::traits::BatchWriter;
use pns_types::event::Event;
use pns_types::params::{Deployment, ProtocolParams};

use crate::error::RegistryError;
use crate::genesis::{self, Contracts};
use crate::transaction::{CallContext, Transaction};

/// Result of a committed operation together with the events it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    pub events: Vec<Event>,
}

/// Owns the store and the deployed components.
///
/// Every [`execute`](Self::execute) call is applied atomically: its writes
/// reach the store in one batch, or not at all. Operations are serialized
/// from their first read to their batch, both between threads sharing the
/// service and, through the store's exclusive span, between processes
/// sharing a database.
pub struct NameService<S: BatchWriter> {
    store: S,
    deployed: Option<(Deployment, Contracts)>,
    write_lock: Mutex<()>,
}

impl<S: BatchWriter> NameService<S> {
    /// Open a service over `store`, loading an existing deployment if any.
    pub fn open(store: S) -> Result<Self, RegistryError> {
        let deployed = match NameStore::new(&store).load_deployment()? {
            Some(deployment) => {
                let contracts = Contracts::from_deployment(&deployment)?;
                Some((deployment, contracts))
            }
            None => None,
        };
        Ok(Self {
            store,
            deployed,
            write_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed.is_some()
    }

    pub fn deployment(&self) -> Result<&Deployment, RegistryError> {
        self.deployed
            .as_ref()
            .map(|(d, _)| d)
            .ok_or(RegistryError::NotDeployed)
    }

    pub fn contracts(&self) -> Result<&Contracts, RegistryError> {
        self.deployed
            .as_ref()
            .map(|(_, c)| c)
            .ok_or(RegistryError::NotDeployed)
    }

    /// Run genesis with `ctx.sender` as the deployer.
    pub fn deploy(
        &mut self,
        ctx: CallContext,
        params: ProtocolParams,
    ) -> Result<Receipt<Deployment>, RegistryError> {
        if self.deployed.is_some() {
            return Err(RegistryError::AlreadyDeployed);
        }
        let receipt = self.commit(ctx, "deploy", |tx| genesis::deploy(tx, params))?;
        let (deployment, contracts) = receipt.value;
        info!(
            tld = %deployment.params.tld,
            deployed_at = deployment.deployed_at,
            "name service deployed"
        );
        self.deployed = Some((deployment.clone(), contracts));
        Ok(Receipt {
            value: deployment,
            events: receipt.events,
        })
    }

    /// Apply one mutating operation.
    pub fn execute<T>(
        &self,
        ctx: CallContext,
        op: &str,
        f: impl FnOnce(&Contracts, &mut Transaction<'_>) -> Result<T, RegistryError>,
    ) -> Result<Receipt<T>, RegistryError> {
        let contracts = self.contracts()?;
        self.commit(ctx, op, |tx| f(contracts, tx))
    }

    /// Evaluate a read-only query at `ctx.timestamp`.
    pub fn query<T>(
        &self,
        ctx: CallContext,
        f: impl FnOnce(&Contracts, &Transaction<'_>) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let contracts = self.contracts()?;
        let tx = Transaction::new(&self.store, ctx);
        f(contracts, &tx)
    }

    fn commit<T>(
        &self,
        ctx: CallContext,
        op: &str,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, RegistryError>,
    ) -> Result<Receipt<T>, RegistryError> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        let _serial = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.begin_exclusive()?;
        let result = self.apply(ctx, op, f);
        // Only rolls back when `apply` stopped before its batch.
        let closed = self.store.end_exclusive();
        let receipt = result?;
        closed?;
        Ok(receipt)
    }

    fn apply<T>(
        &self,
        ctx: CallContext,
        op: &str,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, RegistryError>,
    ) -> Result<Receipt<T>, RegistryError> {
        let mut tx = Transaction::new(&self.store, ctx);
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                debug!(op, error = %e, "operation rejected");
                return Err(e);
            }
        };
        let writes = tx.pending_writes();
        let (ops, events) = tx.into_parts();
        self.store.write_batch(ops)?;
        for event in &events {
            info!(op, event = event.kind(), "{}", describe(event));
        }
        debug!(op, writes, events = events.len(), "operation committed");
        Ok(Receipt { value, events })
    }
}

fn describe(event: &Event) -> String {
    use pns_types::primitives::{address_to_hex, hash_to_hex};
    match event {
        Event::NameRegistered {
            name,
            owner,
            cost,
            expires,
            ..
        } => format!(
            "{} registered to {} for {} until {}",
            name,
            address_to_hex(owner),
            cost,
            expires
        ),
        Event::NameRenewed {
            name, cost, expires, ..
        } => format!("{} renewed for {} until {}", name, cost, expires),
        Event::CommitmentRecorded {
            commitment,
            timestamp,
        } => format!("commitment {} at {}", hash_to_hex(commitment), timestamp),
        Event::ReverseClaimed { addr, node } => format!(
            "reverse record of {} is node {}",
            address_to_hex(addr),
            hash_to_hex(node)
        ),
        Event::Withdrawn { to, amount } => format!("{} withdrawn to {}", amount, address_to_hex(to)),
        other => other.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::RegistrationRequest;
    use pns_crypto::namehash::{namehash, reverse_node};
    use pns_storage::memory::MemoryStore;
    use pns_types::constants::{ONE_TOKEN, SECONDS_PER_YEAR};
    use pns_types::primitives::Address;
    use pns_types::record::ResolverRecord;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const DEPLOYER: Address = [1u8; 20];
    const ALICE: Address = [2u8; 20];

    fn deployed(store: Arc<MemoryStore>) -> NameService<Arc<MemoryStore>> {
        let mut service = NameService::open(store).unwrap();
        service
            .deploy(CallContext::new(DEPLOYER, 100), ProtocolParams::default())
            .unwrap();
        service
    }

    #[test]
    fn test_not_deployed() {
        let service = NameService::open(MemoryStore::new()).unwrap();
        assert!(!service.is_deployed());
        assert!(matches!(
            service.query(CallContext::new(ALICE, 0), |c, tx| c.controller.available(tx, "tess")),
            Err(RegistryError::NotDeployed)
        ));
    }

    #[test]
    fn test_reopen_loads_deployment() {
        let store = Arc::new(MemoryStore::new());
        let service = deployed(store.clone());
        let deployment = service.deployment().unwrap().clone();

        let reopened = NameService::open(store).unwrap();
        assert_eq!(reopened.deployment().unwrap(), &deployment);
        assert_eq!(
            reopened.contracts().unwrap(),
            service.contracts().unwrap()
        );
    }

    #[test]
    fn test_deploy_twice() {
        let store = Arc::new(MemoryStore::new());
        let mut service = deployed(store);
        assert!(matches!(
            service.deploy(CallContext::new(DEPLOYER, 200), ProtocolParams::default()),
            Err(RegistryError::AlreadyDeployed)
        ));
    }

    #[test]
    fn test_failed_operation_leaves_no_trace() {
        let store = Arc::new(MemoryStore::new());
        let service = deployed(store.clone());
        let before = store.len();
        let err = service
            .execute(CallContext::new(ALICE, 200), "add-controller", |c, tx| {
                c.registrar.add_controller(tx, &ALICE)
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert_eq!(store.len(), before);
    }

    #[test]
    fn test_register_then_reverse() {
        let store = Arc::new(MemoryStore::new());
        let service = deployed(store);
        let resolver = service.deployment().unwrap().resolver;
        let request = RegistrationRequest {
            label: "tess".to_string(),
            owner: ALICE,
            duration: SECONDS_PER_YEAR,
            secret: [3u8; 32],
            resolver: Some(resolver),
            records: vec![ResolverRecord::Addr(ALICE)],
        };

        let commit = service
            .execute(CallContext::new(ALICE, 1_000), "commit", |c, tx| {
                c.controller.commit(tx, &request.commitment()?)
            })
            .unwrap();
        assert!(matches!(
            commit.events.as_slice(),
            [Event::CommitmentRecorded { timestamp: 1_000, .. }]
        ));

        let receipt = service
            .execute(CallContext::new(ALICE, 1_070), "register", |c, tx| {
                c.controller.register(tx, &request, 40 * ONE_TOKEN)
            })
            .unwrap();
        assert_eq!(receipt.value.refund, 40 * ONE_TOKEN - receipt.value.cost);
        assert!(receipt
            .events
            .iter()
            .any(|e| matches!(e, Event::NameRegistered { name, .. } if name == "tess.push")));

        service
            .execute(CallContext::new(ALICE, 1_080), "set-reverse-name", |c, tx| {
                c.reverse.set_name(tx, "tess.push")
            })
            .unwrap();

        service
            .query(CallContext::new(ALICE, 1_090), |c, tx| {
                assert_eq!(
                    c.resolver.addr(tx, &namehash("tess.push"))?,
                    Some(ALICE)
                );
                assert_eq!(
                    c.resolver.name(tx, &reverse_node(&ALICE))?,
                    Some("tess.push".to_string())
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_concurrent_registrations_first_wins() {
        let store = Arc::new(MemoryStore::new());
        let service = deployed(store);
        let resolver = service.deployment().unwrap().resolver;
        let bob: Address = [4u8; 20];
        let requests: Vec<RegistrationRequest> = [(ALICE, [3u8; 32]), (bob, [5u8; 32])]
            .into_iter()
            .map(|(owner, secret)| RegistrationRequest {
                label: "tess".to_string(),
                owner,
                duration: SECONDS_PER_YEAR,
                secret,
                resolver: Some(resolver),
                records: Vec::new(),
            })
            .collect();
        for request in &requests {
            service
                .execute(CallContext::new(request.owner, 1_000), "commit", |c, tx| {
                    c.controller.commit(tx, &request.commitment()?)
                })
                .unwrap();
        }

        // The first operation to get in stalls after its reads, leaving room
        // for the other one to read the same state if it were let in.
        let stalled = AtomicBool::new(false);
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| {
                    let (service, stalled) = (&service, &stalled);
                    s.spawn(move || {
                        service.execute(
                            CallContext::new(request.owner, 1_070),
                            "register",
                            |c, tx| {
                                let receipt = c.controller.register(tx, request, 40 * ONE_TOKEN)?;
                                if !stalled.swap(true, Ordering::SeqCst) {
                                    std::thread::sleep(Duration::from_millis(100));
                                }
                                Ok(receipt.cost)
                            },
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<usize> = (0..2).filter(|&i| results[i].is_ok()).collect();
        assert_eq!(winners.len(), 1);
        let loser = 1 - winners[0];
        assert!(matches!(
            results[loser],
            Err(RegistryError::NameUnavailable { .. })
        ));
        let cost = results[winners[0]].as_ref().unwrap().value;

        service
            .query(CallContext::new(ALICE, 1_080), |c, tx| {
                assert_eq!(
                    c.registry.owner(tx, &namehash("tess.push"))?,
                    requests[winners[0]].owner
                );
                assert_eq!(c.controller.balance(tx)?, cost);
                Ok(())
            })
            .unwrap();
    }
}
