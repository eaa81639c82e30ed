use borsh::{BorshDeserialize, BorshSerialize};

use pns_types::params::Deployment;
use pns_types::primitives::{Address, Amount, CommitmentHash, LabelHash, Node, Timestamp};
use pns_types::record::{NodeRecord, Registration, ResolverRecords};

use crate::error::StorageError;
use crate::keys::{self, meta, Table};
use crate::traits::KvStore;

/// Borsh-encode a stored value.
pub fn encode<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    borsh::to_vec(value).map_err(|e| StorageError::SerializationError {
        reason: e.to_string(),
    })
}

/// Borsh-decode the value stored under `key`.
pub fn decode<T: BorshDeserialize>(key: &[u8], bytes: &[u8]) -> Result<T, StorageError> {
    T::try_from_slice(bytes).map_err(|e| StorageError::DeserializationError {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })
}

/// Decode the fixed-size key suffix of a scanned entry.
pub fn decode_suffix<const N: usize>(table: Table, key: &[u8]) -> Result<[u8; N], StorageError> {
    keys::suffix::<N>(table, key).ok_or_else(|| StorageError::MalformedKey {
        table: table.name(),
        key: String::from_utf8_lossy(key).into_owned(),
    })
}

/// Read-only typed view over committed name service state.
pub struct NameStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> NameStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn load<T: BorshDeserialize>(&self, key: &[u8]) -> Result<Option<T>, StorageError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Stored attributes of a node, if it was ever written.
    pub fn load_node(&self, node: &Node) -> Result<Option<NodeRecord>, StorageError> {
        self.load(&keys::node_key(node))
    }

    pub fn load_registration(
        &self,
        label: &LabelHash,
    ) -> Result<Option<Registration>, StorageError> {
        self.load(&keys::label_key(label))
    }

    /// Submission timestamp of a pending commitment.
    pub fn load_commitment(
        &self,
        commitment: &CommitmentHash,
    ) -> Result<Option<Timestamp>, StorageError> {
        self.load(&keys::commitment_key(commitment))
    }

    /// Resolver records of a node; empty when nothing was ever set.
    pub fn load_records(&self, node: &Node) -> Result<ResolverRecords, StorageError> {
        Ok(self.load(&keys::record_key(node))?.unwrap_or_default())
    }

    pub fn load_deployment(&self) -> Result<Option<Deployment>, StorageError> {
        self.load(&keys::meta_key(meta::DEPLOYMENT))
    }

    pub fn load_authority(&self, component: &Address) -> Result<Option<Address>, StorageError> {
        self.load(&keys::meta_key_for(meta::AUTHORITY, component))
    }

    /// Collected, not yet withdrawn payments of a component.
    pub fn load_balance(&self, component: &Address) -> Result<Amount, StorageError> {
        Ok(self
            .load(&keys::meta_key_for(meta::BALANCE, component))?
            .unwrap_or(0))
    }

    pub fn load_default_resolver(
        &self,
        component: &Address,
    ) -> Result<Option<Address>, StorageError> {
        self.load(&keys::meta_key_for(meta::DEFAULT_RESOLVER, component))
    }

    pub fn is_operator(&self, owner: &Address, operator: &Address) -> Result<bool, StorageError> {
        self.store.exists(&keys::operator_key(owner, operator))
    }

    pub fn list_controllers(&self) -> Result<Vec<Address>, StorageError> {
        self.store
            .prefix_scan(Table::Controllers.prefix())?
            .into_iter()
            .map(|(key, _)| decode_suffix::<20>(Table::Controllers, &key))
            .collect()
    }

    /// Every registration ever recorded, expired ones included.
    pub fn list_registrations(&self) -> Result<Vec<(LabelHash, Registration)>, StorageError> {
        self.store
            .prefix_scan(Table::Labels.prefix())?
            .into_iter()
            .map(|(key, value)| {
                let label = decode_suffix::<32>(Table::Labels, &key)?;
                Ok((label, decode(&key, &value)?))
            })
            .collect()
    }

    pub fn list_commitments(&self) -> Result<Vec<(CommitmentHash, Timestamp)>, StorageError> {
        self.store
            .prefix_scan(Table::Commitments.prefix())?
            .into_iter()
            .map(|(key, value)| {
                let commitment = decode_suffix::<32>(Table::Commitments, &key)?;
                Ok((commitment, decode(&key, &value)?))
            })
            .collect()
    }
}
