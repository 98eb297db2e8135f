//! Key Validation
//!
//! Keys and prefixes must match `^[A-Za-z0-9._:/-]{1,256}$`.

use crate::error::{Result, StoreError};
use crate::store::MAX_KEY_LENGTH;

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '/' | '-')
}

// == Validate Key ==
/// Checks a key against the key grammar.
///
/// Every character is ASCII, so the byte length equals the character count
/// once the character check has passed.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("Key cannot be empty".to_string()));
    }

    if let Some(bad) = key.chars().find(|c| !is_key_char(*c)) {
        return Err(StoreError::InvalidKey(format!(
            "Keys must match /^[A-Za-z0-9._:/-]{{1,256}}$/; got {key:?} (bad character {bad:?})"
        )));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::InvalidKey(format!(
            "Key exceeds maximum length of {MAX_KEY_LENGTH} characters"
        )));
    }

    Ok(())
}

// == Validate Prefix ==
/// Same grammar as keys, except the empty prefix matches everything.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    validate_key(prefix)
        .map_err(|e| StoreError::InvalidKey(format!("Invalid prefix {prefix:?}: {e}")))
}
