use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TEXT_KEY_LENGTH, MAX_TEXT_VALUE_LENGTH};
use crate::error::PnsError;
use crate::primitives::*;

/// A node in the namespace tree as stored by the node registry.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct NodeRecord {
    /// Current owner; `ZERO_ADDRESS` for an unset node.
    pub owner: Address,
    /// Resolver responsible for the node, if any.
    pub resolver: Option<Address>,
    /// Caching hint for resolvers.
    pub ttl: Ttl,
}

/// A time-bounded ownership certificate for a label under the base node.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Registration {
    /// Holder of the certificate.
    pub owner: Address,
    /// Unix timestamp after which the certificate lapses.
    pub expires: Timestamp,
}

impl Registration {
    /// True once `now` is strictly past the expiry.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires
    }
}

/// A single resolver record, as supplied at registration time.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum ResolverRecord {
    /// The address the node resolves to.
    Addr(Address),
    /// The canonical name of the node.
    Name(String),
    /// A free-form text entry.
    Text { key: String, value: String },
}

impl ResolverRecord {
    /// Check size limits on the record's payload.
    pub fn validate(&self) -> Result<(), PnsError> {
        match self {
            ResolverRecord::Addr(_) => Ok(()),
            ResolverRecord::Name(name) => check_value_len(name),
            ResolverRecord::Text { key, value } => {
                if key.is_empty() {
                    return Err(PnsError::InvalidRecord(
                        "text key must not be empty".to_string(),
                    ));
                }
                if key.len() > MAX_TEXT_KEY_LENGTH {
                    return Err(PnsError::InvalidRecord(format!(
                        "text key too long: {} > {}",
                        key.len(),
                        MAX_TEXT_KEY_LENGTH
                    )));
                }
                check_value_len(value)
            }
        }
    }
}

fn check_value_len(value: &str) -> Result<(), PnsError> {
    if value.len() > MAX_TEXT_VALUE_LENGTH {
        return Err(PnsError::InvalidRecord(format!(
            "value too long: {} > {}",
            value.len(),
            MAX_TEXT_VALUE_LENGTH
        )));
    }
    Ok(())
}

/// Everything the public resolver stores for one node.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ResolverRecords {
    pub addr: Option<Address>,
    pub name: Option<String>,
    pub texts: BTreeMap<String, String>,
}

impl ResolverRecords {
    /// Apply one record, overwriting any previous value of the same kind/key.
    ///
    /// Setting an empty text value removes the key.
    pub fn apply(&mut self, record: ResolverRecord) {
        match record {
            ResolverRecord::Addr(addr) => self.addr = Some(addr),
            ResolverRecord::Name(name) => self.name = Some(name),
            ResolverRecord::Text { key, value } => {
                if value.is_empty() {
                    self.texts.remove(&key);
                } else {
                    self.texts.insert(key, value);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.addr.is_none() && self.name.is_none() && self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_expiry_is_exclusive() {
        let reg = Registration {
            owner: [1u8; 20],
            expires: 1000,
        };
        assert!(!reg.is_expired(999));
        assert!(!reg.is_expired(1000));
        assert!(reg.is_expired(1001));
    }

    #[test]
    fn test_apply_records() {
        let mut records = ResolverRecords::default();
        assert!(records.is_empty());

        records.apply(ResolverRecord::Addr([5u8; 20]));
        records.apply(ResolverRecord::Name("tess.push".to_string()));
        records.apply(ResolverRecord::Text {
            key: "url".to_string(),
            value: "https://push.org".to_string(),
        });
        records.apply(ResolverRecord::Text {
            key: "url".to_string(),
            value: "https://tess.dev".to_string(),
        });

        assert_eq!(records.addr, Some([5u8; 20]));
        assert_eq!(records.name.as_deref(), Some("tess.push"));
        assert_eq!(records.texts.len(), 1);
        assert_eq!(records.texts["url"], "https://tess.dev");
    }

    #[test]
    fn test_empty_text_value_removes_key() {
        let mut records = ResolverRecords::default();
        records.apply(ResolverRecord::Text {
            key: "avatar".to_string(),
            value: "ipfs://x".to_string(),
        });
        records.apply(ResolverRecord::Text {
            key: "avatar".to_string(),
            value: String::new(),
        });
        assert!(records.is_empty());
    }

    #[test]
    fn test_record_validation() {
        assert!(ResolverRecord::Addr([0u8; 20]).validate().is_ok());
        assert!(ResolverRecord::Text {
            key: String::new(),
            value: "v".to_string()
        }
        .validate()
        .is_err());
        assert!(ResolverRecord::Text {
            key: "k".repeat(MAX_TEXT_KEY_LENGTH + 1),
            value: "v".to_string()
        }
        .validate()
        .is_err());
        assert!(ResolverRecord::Name("n".repeat(MAX_TEXT_VALUE_LENGTH + 1))
            .validate()
            .is_err());
    }
}
