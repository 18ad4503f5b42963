//! Visit record and its wall-clock timestamp.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::NANOS_PER_SEC;

/// Wall-clock instant with nanosecond resolution.
///
/// Ordered by seconds, then nanoseconds. Field order matters: the derived
/// `Ord` compares lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub secs: i64,
    /// Sub-second nanoseconds, always `< 1_000_000_000`.
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(secs: i64, nanos: u32) -> Self {
        debug_assert!(nanos < NANOS_PER_SEC);
        Self { secs, nanos }
    }

    /// Read the system clock.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Convert to a `chrono` date-time, if representable.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.secs, self.nanos)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            secs: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// One recorded visit belonging to a user.
///
/// Immutable once created. The owning collection decides its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    visit_id: u32,
    url: String,
    text: String,
    timestamp: Timestamp,
}

impl Visit {
    /// Create a visit stamped with the current wall-clock time.
    pub fn new(visit_id: u32, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_timestamp(visit_id, url, text, Timestamp::now())
    }

    /// Create a visit with an explicit timestamp (used when loading from disk).
    pub fn with_timestamp(
        visit_id: u32,
        url: impl Into<String>,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            visit_id,
            url: url.into(),
            text: text.into(),
            timestamp,
        }
    }

    pub fn visit_id(&self) -> u32 {
        self.visit_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Visit time as a `chrono` date-time.
    pub fn visited_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.to_datetime()
    }

    /// Most-recent-first ordering used by the recent-visits query.
    pub fn newest_first(a: &Visit, b: &Visit) -> Ordering {
        b.timestamp.cmp(&a.timestamp)
    }
}
