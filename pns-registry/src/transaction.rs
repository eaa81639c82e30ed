//! Write overlay for a single name service operation.
//!
//! A [`Transaction`] buffers every write of one operation on top of the
//! committed store. Reads see the buffered writes first. The service turns
//! the buffer into one atomic batch on success and drops it on failure.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use pns_storage::name_store::{decode, encode};
use pns_storage::traits::{BatchOp, KvStore};
use pns_types::constants::MAX_CALL_DEPTH;
use pns_types::event::Event;
use pns_types::primitives::{Address, Node, Timestamp};

use crate::error::RegistryError;

/// Who is calling, and when, as supplied by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub timestamp: Timestamp,
}

impl CallContext {
    pub fn new(sender: Address, timestamp: Timestamp) -> Self {
        Self { sender, timestamp }
    }
}

/// A single frame on the component call chain.
#[derive(Debug, Clone, Copy)]
struct CallFrame {
    /// Identity the callee sees as its caller.
    caller: Address,
}

pub struct Transaction<'a> {
    store: &'a dyn KvStore,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    events: Vec<Event>,
    frames: Vec<CallFrame>,
    ctx: CallContext,
    registering: Option<Node>,
}

impl<'a> Transaction<'a> {
    pub fn new(store: &'a dyn KvStore, ctx: CallContext) -> Self {
        Self {
            store,
            writes: BTreeMap::new(),
            events: Vec::new(),
            frames: Vec::new(),
            ctx,
            registering: None,
        }
    }

    /// Timestamp of the operation.
    pub fn now(&self) -> Timestamp {
        self.ctx.timestamp
    }

    /// The external account that submitted the operation.
    pub fn origin(&self) -> Address {
        self.ctx.sender
    }

    /// The immediate caller of the component currently executing.
    pub fn caller(&self) -> Address {
        self.frames
            .last()
            .map(|f| f.caller)
            .unwrap_or(self.ctx.sender)
    }

    /// Run `f` as a call made by the component `caller`.
    pub fn call_as<T>(
        &mut self,
        caller: Address,
        f: impl FnOnce(&mut Self) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let depth = self.frames.len() + 1;
        if depth > MAX_CALL_DEPTH {
            return Err(RegistryError::CallDepthExceeded {
                depth,
                max: MAX_CALL_DEPTH,
            });
        }
        self.frames.push(CallFrame { caller });
        let result = f(self);
        self.frames.pop();
        result
    }

    /// Node whose initial records are being installed by the controller.
    pub fn registering(&self) -> Option<Node> {
        self.registering
    }

    /// Run `f` with `node` marked as an in-progress registration.
    pub fn while_registering<T>(
        &mut self,
        node: Node,
        f: impl FnOnce(&mut Self) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let previous = self.registering.replace(node);
        let result = f(self);
        self.registering = previous;
        result
    }

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, RegistryError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => Ok(self.store.get(key)?),
        }
    }

    pub fn get<T: BorshDeserialize>(&self, key: &[u8]) -> Result<Option<T>, RegistryError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, key: &[u8]) -> Result<bool, RegistryError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.is_some()),
            None => Ok(self.store.exists(key)?),
        }
    }

    pub fn put_raw(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    pub fn put<T: BorshSerialize>(&mut self, key: Vec<u8>, value: &T) -> Result<(), RegistryError> {
        let bytes = encode(value)?;
        self.put_raw(key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.writes.insert(key, None);
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of keys touched so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Consume the overlay into a write batch and the emitted events.
    pub fn into_parts(self) -> (Vec<BatchOp>, Vec<Event>) {
        let ops = self
            .writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOp::Put { key, value },
                None => BatchOp::Delete { key },
            })
            .collect();
        (ops, self.events)
    }
}
