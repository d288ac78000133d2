//! Primary key conventions.
//!
//! Every table uses a signed integer key. A record that has not been
//! saved yet, or a reference that is not set, carries [`UNSET_ID`].

/// Marker for "new" or "no reference". Bound as SQL `NULL`.
pub const UNSET_ID: i64 = -1;

/// True when `id` refers to a persisted row.
#[must_use]
pub const fn is_set(id: i64) -> bool {
    id != UNSET_ID
}

/// Convert the sentinel form into an `Option`.
#[must_use]
pub const fn to_option(id: i64) -> Option<i64> {
    if is_set(id) { Some(id) } else { None }
}
