use thiserror::Error;

use pns_types::error::PnsError;
use pns_types::primitives::{Amount, Timestamp};

/// Errors surfaced by name service operations.
///
/// Any error aborts the whole operation: nothing it wrote is committed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown commitment {commitment}")]
    UnknownCommitment { commitment: String },

    #[error("commitment too new: committed at {committed_at}, now {now}, minimum age {min_age}s")]
    CommitmentTooNew {
        committed_at: Timestamp,
        now: Timestamp,
        min_age: u64,
    },

    #[error("commitment too old: age {age}s exceeds max {max_age}s")]
    CommitmentTooOld { age: u64, max_age: u64 },

    #[error("unexpired commitment {commitment} already exists")]
    UnexpiredCommitmentExists { commitment: String },

    #[error("name unavailable: {name}")]
    NameUnavailable { name: String },

    #[error("insufficient payment: required {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    #[error("unauthorized: {caller} {reason}")]
    Unauthorized { caller: String, reason: String },

    #[error("invalid duration: {reason}")]
    InvalidDuration { reason: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("invalid name: {reason}")]
    InvalidName { reason: String },

    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    #[error("invalid parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("invalid price table: {reason}")]
    InvalidPriceTable { reason: String },

    #[error("initial records require the public resolver")]
    ResolverRequired,

    #[error("registrar does not own its base node")]
    NotLive,

    #[error("arithmetic overflow in {what}")]
    Overflow { what: &'static str },

    #[error("name service already deployed")]
    AlreadyDeployed,

    #[error("name service not deployed")]
    NotDeployed,

    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded { depth: usize, max: usize },

    #[error("storage error: {0}")]
    Storage(#[from] pns_storage::error::StorageError),
}

impl From<PnsError> for RegistryError {
    fn from(err: PnsError) -> Self {
        match err {
            PnsError::InvalidName(reason) => RegistryError::InvalidName { reason },
            PnsError::InvalidRecord(reason) => RegistryError::InvalidRecord { reason },
            PnsError::InvalidParams(reason) => RegistryError::InvalidParams { reason },
            PnsError::InvalidPriceTable(reason) => RegistryError::InvalidPriceTable { reason },
        }
    }
}
