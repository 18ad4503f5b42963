//! Per-user visit collection with an id index.

use std::collections::HashSet;

use visits_core::Visit;

use crate::eviction;

/// The capacity-managed set of visits belonging to one user.
///
/// Order is unspecified: removals swap the last record into the hole and the
/// recent-visits query sorts in place. `ids` mirrors the `visit_id`s in
/// `visits` for O(1) duplicate checks.
#[derive(Debug, Clone)]
pub struct UserVisits {
    user_id: u32,
    visits: Vec<Visit>,
    ids: HashSet<u32>,
}

impl UserVisits {
    pub fn new(user_id: u32) -> Self {
        Self::with_capacity(user_id, 0)
    }

    pub fn with_capacity(user_id: u32, capacity: usize) -> Self {
        Self {
            user_id,
            visits: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn contains(&self, visit_id: u32) -> bool {
        self.ids.contains(&visit_id)
    }

    /// Records in their current (unspecified) order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn get(&self, visit_id: u32) -> Option<&Visit> {
        if !self.contains(visit_id) {
            return None;
        }
        self.visits.iter().find(|v| v.visit_id() == visit_id)
    }

    /// Add a record. Returns false, leaving the collection untouched, if its
    /// id is already present. Capacity is the caller's concern.
    pub(crate) fn insert(&mut self, visit: Visit) -> bool {
        if !self.ids.insert(visit.visit_id()) {
            return false;
        }
        self.visits.push(visit);
        true
    }

    /// Swap-remove the first record with `visit_id`.
    pub(crate) fn remove(&mut self, visit_id: u32) -> Option<Visit> {
        if !self.ids.remove(&visit_id) {
            return None;
        }
        let idx = self.visits.iter().position(|v| v.visit_id() == visit_id)?;
        Some(self.visits.swap_remove(idx))
    }

    /// Swap-remove the record with the oldest timestamp.
    pub(crate) fn evict_oldest(&mut self) -> Option<Visit> {
        let idx = eviction::oldest_index(&self.visits)?;
        let evicted = self.visits.swap_remove(idx);
        self.ids.remove(&evicted.visit_id());
        Some(evicted)
    }

    pub(crate) fn clear(&mut self) {
        self.visits.clear();
        self.ids.clear();
    }

    /// Sort in place, most recent first. Ties keep no particular order.
    pub(crate) fn sort_newest_first(&mut self) -> &[Visit] {
        self.visits.sort_unstable_by(Visit::newest_first);
        &self.visits
    }
}
