//! VisitStore — owns every user's visits, enforces the capacity bound, and
//! rewrites the backing file after each mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use visits_core::config::StoreConfig;
use visits_core::errors::{VisitError, VisitResult};
use visits_core::{Timestamp, Visit};

use crate::codec;
use crate::user_visits::UserVisits;

/// Result of a successful `add_visit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The visit was stored with room to spare.
    Inserted,
    /// The visit was stored after evicting the user's oldest visit.
    Evicted(Visit),
    /// A visit with this id already exists for the user; nothing changed.
    Duplicate,
}

impl AddOutcome {
    /// Whether the new visit is now in the store.
    pub fn is_stored(&self) -> bool {
        !matches!(self, AddOutcome::Duplicate)
    }
}

/// Bounded, file-backed store of recent visits per user.
///
/// Single owner, synchronous: each mutating call blocks until the full image
/// has been rewritten. No file locking; two stores on one path will clobber
/// each other.
#[derive(Debug)]
pub struct VisitStore {
    users: HashMap<u32, UserVisits>,
    max_visits: usize,
    path: PathBuf,
}

impl VisitStore {
    /// Open the store at `path`, loading it if the file exists.
    ///
    /// The capacity stored in the file is ignored in favour of `max_visits`.
    /// A missing or unreadable file yields an empty store.
    pub fn open(path: impl AsRef<Path>, max_visits: usize) -> VisitResult<Self> {
        if max_visits == 0 {
            return Err(VisitError::InvalidCapacity { max_visits });
        }
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            match codec::load(&path, max_visits) {
                Ok(decoded) => {
                    tracing::info!(
                        path = %path.display(),
                        users = decoded.users.len(),
                        stored_max_visits = decoded.stored_max_visits,
                        max_visits,
                        "loaded visit store"
                    );
                    if decoded.dropped_visits > 0 {
                        tracing::debug!(
                            path = %path.display(),
                            dropped = decoded.dropped_visits,
                            "dropped visits beyond capacity or with repeated ids"
                        );
                    }
                    let mut users = HashMap::with_capacity(decoded.users.len());
                    for user in decoded.users {
                        // First occurrence of a user id wins.
                        users.entry(user.user_id()).or_insert(user);
                    }
                    users
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load visit store, starting empty"
                    );
                    HashMap::new()
                }
            }
        } else {
            tracing::debug!(path = %path.display(), "no visit store on disk, starting empty");
            HashMap::new()
        };

        Ok(Self {
            users,
            max_visits,
            path,
        })
    }

    /// Open the store described by `config`.
    pub fn open_with_config(config: &StoreConfig) -> VisitResult<Self> {
        config.validate()?;
        Self::open(&config.path, config.max_visits)
    }

    /// Record a visit stamped with the current wall-clock time.
    ///
    /// A repeated `visit_id` for the user is a no-op success. When the user
    /// is at capacity the oldest visit is evicted first. The whole store is
    /// then persisted; a failed write is logged and otherwise ignored.
    pub fn add_visit(
        &mut self,
        user_id: u32,
        visit_id: u32,
        url: &str,
        text: &str,
    ) -> VisitResult<AddOutcome> {
        self.add_visit_at(user_id, visit_id, url, text, Timestamp::now())
    }

    /// Record a visit with an explicit timestamp, e.g. when importing history.
    pub fn add_visit_at(
        &mut self,
        user_id: u32,
        visit_id: u32,
        url: &str,
        text: &str,
        timestamp: Timestamp,
    ) -> VisitResult<AddOutcome> {
        // Strings are stored NUL-terminated on disk.
        if url.contains('\0') {
            return Err(VisitError::InteriorNul { visit_id, field: "url" });
        }
        if text.contains('\0') {
            return Err(VisitError::InteriorNul { visit_id, field: "text" });
        }

        let max_visits = self.max_visits;
        let user = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserVisits::new(user_id));

        if user.contains(visit_id) {
            tracing::debug!(user_id, visit_id, "visit already recorded, ignoring");
            return Ok(AddOutcome::Duplicate);
        }

        let evicted = if user.len() >= max_visits {
            user.evict_oldest()
        } else {
            None
        };
        if let Some(old) = &evicted {
            tracing::debug!(
                user_id,
                evicted_id = old.visit_id(),
                evicted_at = %old.timestamp(),
                "evicted oldest visit"
            );
        }

        user.insert(Visit::with_timestamp(visit_id, url, text, timestamp));
        self.persist();

        Ok(match evicted {
            Some(old) => AddOutcome::Evicted(old),
            None => AddOutcome::Inserted,
        })
    }

    /// The user's visits, most recent first. Empty for an unknown user.
    ///
    /// Sorts the stored collection in place, so the new order is also the
    /// order the next save writes.
    pub fn recent_visits(&mut self, user_id: u32) -> &[Visit] {
        match self.users.get_mut(&user_id) {
            Some(user) => user.sort_newest_first(),
            None => &[],
        }
    }

    /// Number of visits stored for the user (0 if unknown).
    pub fn visit_count(&self, user_id: u32) -> usize {
        self.users.get(&user_id).map_or(0, UserVisits::len)
    }

    /// Delete each of `visit_ids` for the user, skipping ids not present.
    ///
    /// Returns true iff at least one visit was removed. Persists only then.
    pub fn delete_visits(&mut self, user_id: u32, visit_ids: &[u32]) -> bool {
        if visit_ids.is_empty() {
            return false;
        }
        let Some(user) = self.users.get_mut(&user_id) else {
            return false;
        };

        let removed = visit_ids
            .iter()
            .filter(|&&id| user.remove(id).is_some())
            .count();
        if removed == 0 {
            return false;
        }

        tracing::debug!(user_id, removed, requested = visit_ids.len(), "deleted visits");
        self.persist();
        true
    }

    /// Remove all of the user's visits. The user entry itself remains.
    ///
    /// An unknown user is left unknown and nothing is written. A known user
    /// is always persisted, even if already empty.
    pub fn clear_user(&mut self, user_id: u32) {
        let Some(user) = self.users.get_mut(&user_id) else {
            return;
        };
        user.clear();
        tracing::debug!(user_id, "cleared visits");
        self.persist();
    }

    /// Write the full store image now, reporting any I/O failure.
    pub fn save(&self) -> VisitResult<()> {
        let mut users: Vec<&UserVisits> = self.users.values().collect();
        users.sort_unstable_by_key(|u| u.user_id());
        let image = codec::encode(self.max_visits, users);

        codec::write_image(&self.path, &image).map_err(|source| VisitError::Persist {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Release the store. Equivalent to dropping it.
    pub fn close(self) {}

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "visit store not persisted; change is in memory only");
        }
    }

    pub fn max_visits(&self) -> usize {
        self.max_visits
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn contains_user(&self, user_id: u32) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Known user ids, ascending.
    pub fn user_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Read-only view of one user's collection, in its current order.
    pub fn user(&self, user_id: u32) -> Option<&UserVisits> {
        self.users.get(&user_id)
    }
}
