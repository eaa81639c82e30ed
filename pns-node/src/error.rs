use pns_registry::error::RegistryError;
use thiserror::Error;

/// Errors surfaced by the `pns` executor.
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum NodeError {
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] pns_storage::error::StorageError),

    #[error("{0}")]
    RegistryError(#[from] RegistryError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::SerializationError(e.to_string())
    }
}

impl NodeError {
    /// A suggestion printed under the error message, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            NodeError::RegistryError(RegistryError::NotDeployed) => {
                Some("run `pns deploy --from <address>` first")
            }
            NodeError::RegistryError(RegistryError::CommitmentTooNew { .. }) => {
                Some("wait for the minimum commitment age, or pass a later --at")
            }
            NodeError::RegistryError(RegistryError::CommitmentTooOld { .. }) => {
                Some("the commitment went stale; commit it again")
            }
            NodeError::RegistryError(RegistryError::UnknownCommitment { .. }) => Some(
                "the reveal must use exactly the label, owner, duration, secret, resolver and records that were committed",
            ),
            NodeError::RegistryError(RegistryError::ResolverRequired) => {
                Some("initial records need --resolver public")
            }
            NodeError::ConfigError { .. } => Some("run `pns init` to write a default pns.toml"),
            _ => None,
        }
    }
}
