use crate::constants::MAX_LABEL_LENGTH;
use crate::error::PnsError;

/// Number of characters in a label, as used by the price oracle.
pub fn label_length(label: &str) -> usize {
    label.chars().count()
}

/// Validate a single label: lowercase alphanumeric + hyphens, 1-63 chars,
/// no leading/trailing hyphen, no dots.
pub fn validate_label(label: &str) -> Result<(), PnsError> {
    let len = label_length(label);
    if len == 0 || len > MAX_LABEL_LENGTH {
        return Err(PnsError::InvalidName(format!(
            "label must be 1-{} characters, got {}",
            MAX_LABEL_LENGTH, len
        )));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(PnsError::InvalidName(
            "label must not start or end with a hyphen".to_string(),
        ));
    }
    for c in label.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
            return Err(PnsError::InvalidName(format!(
                "label must be lowercase alphanumeric or hyphens, found '{}'",
                c
            )));
        }
    }
    Ok(())
}

/// Split a dotted name into labels, leaf first. The empty name has no labels.
pub fn split_name(name: &str) -> Vec<&str> {
    if name.is_empty() {
        return Vec::new();
    }
    name.split('.').collect()
}

/// Validate every label of a dotted name.
pub fn validate_name(name: &str) -> Result<(), PnsError> {
    if name.is_empty() {
        return Err(PnsError::InvalidName("name must not be empty".to_string()));
    }
    for label in split_name(name) {
        validate_label(label)?;
    }
    Ok(())
}

/// Strip a trailing `.tld` from a name, returning the leaf label.
///
/// `"tess.push"` with tld `"push"` yields `"tess"`; a bare label is returned as is.
pub fn strip_tld<'a>(name: &'a str, tld: &str) -> &'a str {
    name.strip_suffix(tld)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(name)
}
