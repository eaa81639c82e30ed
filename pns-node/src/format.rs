use console::Style;
use pns_types::constants::{ONE_TOKEN, PAYMENT_DECIMALS, SECONDS_PER_DAY};
use pns_types::primitives::{self, Address, Amount, Hash, Timestamp};

use crate::error::NodeError;

// ── Styles ──────────────────────────────────────────────────────────────────

pub fn style_success() -> Style {
    Style::new().green()
}

pub fn style_error() -> Style {
    Style::new().red()
}

pub fn style_warn() -> Style {
    Style::new().yellow()
}

pub fn style_info() -> Style {
    Style::new().cyan()
}

pub fn style_bold() -> Style {
    Style::new().bold()
}

pub fn style_dim() -> Style {
    Style::new().dim()
}

// ── Amount formatting ───────────────────────────────────────────────────────

/// Format an Amount as "1,234.5", dropping trailing fractional zeros.
pub fn format_amount(amount: Amount) -> String {
    let decimals = PAYMENT_DECIMALS as usize;
    let whole = amount / ONE_TOKEN;
    let frac = amount % ONE_TOKEN;

    let whole_str = format_with_commas(whole);
    if frac == 0 {
        return whole_str;
    }
    let frac_str = format!("{:0>width$}", frac, width = decimals);
    format!("{}.{}", whole_str, frac_str.trim_end_matches('0'))
}

/// Parse a human-readable amount string (e.g. "10.5") into base units.
///
/// More fractional digits than the token's precision are rejected.
pub fn parse_amount(s: &str) -> Result<Amount, NodeError> {
    let s = s.trim().replace(',', "");
    let invalid = || NodeError::InvalidAmount(s.clone());
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s.as_str(), ""),
    };
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits(whole) || !digits(frac) {
        return Err(invalid());
    }

    let decimals = PAYMENT_DECIMALS as usize;
    if frac.len() > decimals {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let padded = format!("{:0<width$}", frac, width = decimals);
    let frac: u128 = padded.parse().map_err(|_| invalid())?;

    whole
        .checked_mul(ONE_TOKEN)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)
}

fn format_with_commas(n: u128) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

// ── Address / hash formatting ───────────────────────────────────────────────

/// Format an Address as a 0x-prefixed hex string.
pub fn format_address(addr: &Address) -> String {
    primitives::address_to_hex(addr)
}

pub fn format_hash(hash: &Hash) -> String {
    primitives::hash_to_hex(hash)
}

/// Parse a hex address string (with or without 0x prefix) into an Address.
pub fn parse_address(s: &str) -> Result<Address, NodeError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    if hex_str.len() != 40 {
        return Err(NodeError::InvalidAddress(format!(
            "expected 40 hex chars, got {}",
            hex_str.len()
        )));
    }
    primitives::parse_address(hex_str)
        .ok_or_else(|| NodeError::InvalidAddress(format!("invalid hex: {}", s)))
}

/// Parse a 32-byte hex value such as a commitment or secret.
pub fn parse_hash(s: &str) -> Result<Hash, NodeError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    if hex_str.len() != 64 {
        return Err(NodeError::InvalidHash(format!(
            "expected 64 hex chars, got {}",
            hex_str.len()
        )));
    }
    primitives::parse_hash(hex_str).ok_or_else(|| NodeError::InvalidHash(format!("invalid hex: {}", s)))
}

// ── Time formatting ─────────────────────────────────────────────────────────

pub fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Whole days when the duration is a multiple of a day, seconds otherwise.
pub fn format_duration(secs: u64) -> String {
    if secs > 0 && secs % SECONDS_PER_DAY == 0 {
        let days = secs / SECONDS_PER_DAY;
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    } else {
        format!("{}s", secs)
    }
}

// ── Display helpers ─────────────────────────────────────────────────────────

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("  {} {}", style_success().apply_to("✓"), msg);
}

/// Print an error message with a hint.
pub fn print_error(msg: &str, hint: Option<&str>) {
    eprintln!("  {} {}", style_error().apply_to("Error:"), msg);
    if let Some(h) = hint {
        eprintln!(
            "  {} {}",
            style_dim().apply_to("Hint:"),
            style_dim().apply_to(h)
        );
    }
}

/// Print a warning line.
pub fn print_warn(msg: &str) {
    println!("  {} {}", style_warn().apply_to("!"), msg);
}

/// Print a labelled value.
pub fn print_info(label: &str, value: &str) {
    println!(
        "  {}: {}",
        style_bold().apply_to(label),
        style_info().apply_to(value)
    );
}

/// Print a divider.
pub fn print_divider() {
    println!(
        "  {}",
        style_dim().apply_to("────────────────────────────────")
    );
}
