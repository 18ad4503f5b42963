//! Oldest-first eviction policy.

use visits_core::Visit;

/// Index of the record with the smallest timestamp.
///
/// Ties go to the first match in slice order, so the choice is deterministic
/// for a given layout but shifts as swap-removes and sorts reorder the slice.
pub fn oldest_index(visits: &[Visit]) -> Option<usize> {
    visits
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| v.timestamp())
        .map(|(i, _)| i)
}
