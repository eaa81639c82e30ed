//! Single-authority access control for components.

use pns_storage::keys::{meta, meta_key_for};
use pns_types::event::Event;
use pns_types::primitives::{address_to_hex, Address, ZERO_ADDRESS};

use crate::error::RegistryError;
use crate::transaction::Transaction;

/// The administrative authority of one component, stored under
/// `pns:meta:authority:<component>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownable {
    contract: Address,
}

impl Ownable {
    pub fn new(contract: Address) -> Self {
        Self { contract }
    }

    /// Set the initial authority. Only used at genesis.
    pub fn init(&self, tx: &mut Transaction<'_>, owner: &Address) -> Result<(), RegistryError> {
        tx.put(meta_key_for(meta::AUTHORITY, &self.contract), owner)
    }

    pub fn owner(&self, tx: &Transaction<'_>) -> Result<Address, RegistryError> {
        Ok(tx
            .get(&meta_key_for(meta::AUTHORITY, &self.contract))?
            .unwrap_or(ZERO_ADDRESS))
    }

    pub fn is_owner(&self, tx: &Transaction<'_>, who: &Address) -> Result<bool, RegistryError> {
        Ok(*who != ZERO_ADDRESS && self.owner(tx)? == *who)
    }

    /// Assert that the current caller is the authority.
    pub fn require_owner(&self, tx: &Transaction<'_>) -> Result<(), RegistryError> {
        let caller = tx.caller();
        if !self.is_owner(tx, &caller)? {
            return Err(RegistryError::Unauthorized {
                caller: address_to_hex(&caller),
                reason: format!("is not the authority of {}", address_to_hex(&self.contract)),
            });
        }
        Ok(())
    }

    /// Hand the authority to another account (authority only).
    pub fn transfer_ownership(
        &self,
        tx: &mut Transaction<'_>,
        new_owner: &Address,
    ) -> Result<(), RegistryError> {
        self.require_owner(tx)?;
        if *new_owner == ZERO_ADDRESS {
            return Err(RegistryError::InvalidParams {
                reason: "new authority cannot be the zero address".to_string(),
            });
        }
        let previous_owner = self.owner(tx)?;
        self.init(tx, new_owner)?;
        tx.emit(Event::OwnershipTransferred {
            contract: self.contract,
            previous_owner,
            new_owner: *new_owner,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::CallContext;
    use pns_storage::memory::MemoryStore;

    const CONTRACT: Address = [9u8; 20];
    const ALICE: Address = [1u8; 20];
    const BOB: Address = [2u8; 20];

    #[test]
    fn test_init_and_require_owner() {
        let store = MemoryStore::new();
        let ownable = Ownable::new(CONTRACT);

        let mut tx = Transaction::new(&store, CallContext::new(ALICE, 0));
        ownable.init(&mut tx, &ALICE).unwrap();
        assert_eq!(ownable.owner(&tx).unwrap(), ALICE);
        assert!(ownable.require_owner(&tx).is_ok());

        let err = tx
            .call_as(BOB, |tx| ownable.require_owner(tx))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
    }

    #[test]
    fn test_unset_authority_rejects_everyone() {
        let store = MemoryStore::new();
        let ownable = Ownable::new(CONTRACT);
        let tx = Transaction::new(&store, CallContext::new(ZERO_ADDRESS, 0));
        assert!(ownable.require_owner(&tx).is_err());
    }

    #[test]
    fn test_transfer_ownership() {
        let store = MemoryStore::new();
        let ownable = Ownable::new(CONTRACT);
        let mut tx = Transaction::new(&store, CallContext::new(ALICE, 0));
        ownable.init(&mut tx, &ALICE).unwrap();

        ownable.transfer_ownership(&mut tx, &BOB).unwrap();
        assert_eq!(ownable.owner(&tx).unwrap(), BOB);
        assert!(matches!(
            tx.events().last(),
            Some(Event::OwnershipTransferred { new_owner, .. }) if *new_owner == BOB
        ));

        // Alice no longer holds the authority.
        assert!(ownable.transfer_ownership(&mut tx, &ALICE).is_err());
        assert!(ownable.transfer_ownership(&mut tx, &ZERO_ADDRESS).is_err());
    }
}
