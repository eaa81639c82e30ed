use crate::primitives::{Amount, Timestamp};

// ─── Token Parameters ────────────────────────────────────────────────────────

/// Number of decimal places of the payment token.
pub const PAYMENT_DECIMALS: u32 = 18;

/// One full payment token in base units (10^18).
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

// ─── Time ────────────────────────────────────────────────────────────────────

/// Seconds in one day; prices are quoted per day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

// ─── Namespace ───────────────────────────────────────────────────────────────

/// Default top-level label managed by the base registrar.
pub const DEFAULT_TLD: &str = "push";

/// Label of the reverse namespace under the root.
pub const REVERSE_LABEL: &str = "reverse";

/// Label of the address sub-namespace under `reverse`.
pub const ADDR_REVERSE_LABEL: &str = "addr";

/// Maximum length of a single label, in characters.
pub const MAX_LABEL_LENGTH: usize = 63;

// ─── Commit-Reveal ───────────────────────────────────────────────────────────

/// Minimum age before a commitment may be revealed (seconds).
pub const DEFAULT_MIN_COMMITMENT_AGE: Timestamp = 60; // 1 minute

/// Maximum age after which a commitment is stale (seconds).
pub const DEFAULT_MAX_COMMITMENT_AGE: Timestamp = 86_400; // 24 hours

/// Shortest registration the controller accepts (seconds).
pub const DEFAULT_MIN_REGISTRATION_DURATION: u64 = 28 * SECONDS_PER_DAY;

/// Window after expiry during which only renewal is allowed (seconds).
pub const DEFAULT_GRACE_PERIOD: u64 = 0;

// ─── Resolver Records ────────────────────────────────────────────────────────

/// Maximum number of records supplied at registration.
pub const MAX_INITIAL_RECORDS: usize = 32;

/// Maximum length of a text record key in bytes.
pub const MAX_TEXT_KEY_LENGTH: usize = 256;

/// Maximum length of a text record value or canonical name in bytes.
pub const MAX_TEXT_VALUE_LENGTH: usize = 4_096;

// ─── Pricing ─────────────────────────────────────────────────────────────────

/// Default per-day price tiers for 1, 2, 3, 4 and 5+ character labels.
pub const DEFAULT_PRICE_TIERS: [Amount; 5] = [
    ONE_TOKEN,              // 1 character
    ONE_TOKEN / 2,          // 2 characters
    ONE_TOKEN * 3 / 10,     // 3 characters
    ONE_TOKEN / 10,         // 4 characters
    ONE_TOKEN / 20,         // 5+ characters
];

// ─── Execution ───────────────────────────────────────────────────────────────

/// Maximum depth of nested component calls within one operation.
pub const MAX_CALL_DEPTH: usize = 8;
