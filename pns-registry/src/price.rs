use pns_types::constants::SECONDS_PER_DAY;
use pns_types::params::validate_price_tiers;
use pns_types::primitives::Amount;

use crate::error::RegistryError;

/// Length-tiered rent pricing.
///
/// `tiers[i]` is the per-day price of a label with `i + 1` characters; labels
/// longer than the table pay the last tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceOracle {
    tiers: Vec<Amount>,
}

impl PriceOracle {
    pub fn new(tiers: Vec<Amount>) -> Result<Self, RegistryError> {
        validate_price_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Amount] {
        &self.tiers
    }

    /// Per-day price for a label of `length` characters.
    ///
    /// Length 0 is priced as length 1.
    pub fn price(&self, length: usize) -> Amount {
        let index = length.saturating_sub(1).min(self.tiers.len() - 1);
        self.tiers[index]
    }

    /// Rent for `duration` seconds: `ceil(price * duration / 86400)`.
    pub fn rent(&self, length: usize, duration: u64) -> Result<Amount, RegistryError> {
        let total = self
            .price(length)
            .checked_mul(Amount::from(duration))
            .ok_or(RegistryError::Overflow { what: "rent" })?;
        Ok(total.div_ceil(Amount::from(SECONDS_PER_DAY)))
    }
}
