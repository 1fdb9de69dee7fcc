//! Name hashing used for cache, type and field ids.
//!
//! The server routes requests by integer ids derived from names with the java
//! `String::hashCode` recurrence:
//!
//! ```text
//! h = 0
//! for b in bytes:
//!     h = 31 * h + b
//! ```
//!
//! # Compatibility
//!
//! The recurrence runs over the raw utf8 *bytes* of the name, not over utf16
//! code units as java does. Both agree for ascii names. For names containing
//! multi-byte characters the ids may differ from what a java node computes,
//! this is a known compatibility risk and is left as is.

/// Hash `name` into a 32 bit id.
///
/// Empty string maps to `1`.
///
/// ```
/// assert_eq!(ignis::hash::hash_code("T"), 84);
/// assert_eq!(ignis::hash::hash_code(""), 1);
/// ```
pub fn hash_code(name: &str) -> i32 {
    if name.is_empty() {
        return 1;
    }
    hash_bytes(name.as_bytes())
}

/// The hash recurrence over raw bytes.
pub fn hash_bytes(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0i32, |h, &b| h.wrapping_mul(31).wrapping_add(i32::from(b)))
}

/// Cache id of a cache name, used by every cache scoped request.
pub fn cache_id(name: &str) -> i32 {
    hash_code(name)
}

/// Type or field id, which is the hash of the lower cased name.
pub fn name_id(name: &str) -> i32 {
    hash_code(&name.to_lowercase())
}
