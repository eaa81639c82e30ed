use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PnsError;
use crate::name::validate_label;
use crate::primitives::*;

/// Protocol parameters fixed at deployment.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Top-level label managed by the base registrar.
    pub tld: String,
    /// Minimum commitment age before reveal (seconds).
    pub min_commitment_age: u64,
    /// Maximum commitment age before it goes stale (seconds).
    pub max_commitment_age: u64,
    /// Shortest registration accepted by the controller (seconds).
    pub min_registration_duration: u64,
    /// Renewal-only window after expiry (seconds).
    pub grace_period: u64,
    /// Per-day price for labels of 1, 2, ... N+ characters.
    pub price_tiers: Vec<Amount>,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            tld: DEFAULT_TLD.to_string(),
            min_commitment_age: DEFAULT_MIN_COMMITMENT_AGE,
            max_commitment_age: DEFAULT_MAX_COMMITMENT_AGE,
            min_registration_duration: DEFAULT_MIN_REGISTRATION_DURATION,
            grace_period: DEFAULT_GRACE_PERIOD,
            price_tiers: DEFAULT_PRICE_TIERS.to_vec(),
        }
    }
}

impl ProtocolParams {
    /// Reject parameter sets that would make the protocol inconsistent.
    pub fn validate(&self) -> Result<(), PnsError> {
        validate_label(&self.tld)?;
        if self.tld == REVERSE_LABEL {
            return Err(PnsError::InvalidParams(format!(
                "tld '{}' is reserved for reverse records",
                REVERSE_LABEL
            )));
        }
        if self.max_commitment_age <= self.min_commitment_age {
            return Err(PnsError::InvalidParams(format!(
                "max commitment age {} must exceed min commitment age {}",
                self.max_commitment_age, self.min_commitment_age
            )));
        }
        validate_price_tiers(&self.price_tiers)
    }
}

/// Price tiers must be non-empty and non-increasing with length.
pub fn validate_price_tiers(tiers: &[Amount]) -> Result<(), PnsError> {
    if tiers.is_empty() {
        return Err(PnsError::InvalidPriceTable(
            "at least one tier is required".to_string(),
        ));
    }
    for (i, pair) in tiers.windows(2).enumerate() {
        if pair[1] > pair[0] {
            return Err(PnsError::InvalidPriceTable(format!(
                "tier {} ({}) is more expensive than tier {} ({})",
                i + 2,
                pair[1],
                i + 1,
                pair[0]
            )));
        }
    }
    Ok(())
}

/// Identities and anchors of a deployed name service.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Deployment {
    /// Account that owned the root at genesis.
    pub deployer: Address,
    pub registry: Address,
    pub registrar: Address,
    pub controller: Address,
    pub resolver: Address,
    pub reverse_registrar: Address,
    /// `namehash(tld)`.
    pub base_node: Node,
    /// `namehash("addr.reverse")`.
    pub reverse_node: Node,
    pub deployed_at: Timestamp,
    pub params: ProtocolParams,
}
