//! Flat key scheme for record partitions.
//!
//! Single-field types are stored under the bare owner name. Multi-field
//! types store each field under `name*field`, so every key of one record
//! shares the `name*` prefix.

use crate::error::{CoreError, Result};
use crate::record::{RecordType, Slot};

/// Separator between owner name and field name in composite keys.
pub const SEPARATOR: u8 = b'*';

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalize an owner name: trailing dot removed, ASCII lowercased.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// Key of a single-field record.
#[must_use]
pub fn record_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

/// Key of one field of a multi-field record.
#[must_use]
pub fn field_key(name: &str, field: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(name.len() + 1 + field.len());
    key.extend_from_slice(name.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(field.as_bytes());
    key
}

/// Key for a storage slot of `name`.
#[must_use]
pub fn slot_key(name: &str, slot: Slot) -> Vec<u8> {
    match slot {
        Slot::Whole => record_key(name),
        Slot::Field(field) => field_key(name, field),
    }
}

/// Every key a record of `rtype` owned by `name` occupies.
#[must_use]
pub fn storage_keys(rtype: RecordType, name: &str) -> Vec<(Slot, Vec<u8>)> {
    rtype
        .slots()
        .iter()
        .map(|&slot| (slot, slot_key(name, slot)))
        .collect()
}

/// Owner name part of a stored key, with any `*field` suffix stripped.
#[must_use]
pub fn owner_name(key: &[u8]) -> &[u8] {
    key.iter()
        .position(|&b| b == SEPARATOR)
        .map_or(key, |idx| &key[..idx])
}

/// Check a normalized owner name before it is written.
pub fn validate_owner_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CoreError::Validation("owner name is empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "owner name is {} octets, limit is {MAX_NAME_LEN}",
            name.len()
        )));
    }
    if name.bytes().any(|b| b == SEPARATOR) {
        return Err(CoreError::Validation(format!(
            "owner name '{name}' contains reserved '*'"
        )));
    }
    validate_labels(name)
}

/// Check that every label of a dotted name is 1-63 printable octets.
pub(crate) fn validate_labels(name: &str) -> Result<()> {
    for label in name.split('.') {
        if label.is_empty() {
            return Err(CoreError::Validation(format!(
                "name '{name}' has an empty label"
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(CoreError::Validation(format!(
                "label '{label}' exceeds {MAX_LABEL_LEN} octets"
            )));
        }
        if label.bytes().any(|b| !b.is_ascii_graphic()) {
            return Err(CoreError::Validation(format!(
                "label '{label}' contains whitespace or non-ASCII octets"
            )));
        }
    }
    Ok(())
}
