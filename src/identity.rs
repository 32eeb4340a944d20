//! Username canonicalization.
//!
//! Every user and todo list is keyed by the canonical form of the username:
//! surrounding whitespace removed, lowercased. An empty canonical key is never
//! a valid identity.

/// Canonical lookup key for a raw username.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Find the stored key a raw username refers to.
///
/// Tries the exact canonical key first, then falls back to a case-insensitive
/// scan so keys written before canonicalization was applied consistently are
/// still reachable.
///
/// When several legacy keys match, the first one `keys` yields wins. For a
/// `BTreeMap` that is the lexicographically smallest key, not insertion order.
pub fn resolve_existing_key<'a, I>(raw: &str, keys: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return None;
    }

    let mut fallback = None;
    for key in keys {
        if *key == normalized {
            return Some(normalized);
        }
        if fallback.is_none() && key.to_lowercase() == normalized {
            fallback = Some(key.clone());
        }
    }
    fallback
}
