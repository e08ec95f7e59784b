//! Decides whether a cached analysis can be served or must be recomputed.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::types::{AnalysisResult, CacheEntry};

pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    max_age: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::with_max_age(Duration::days(DEFAULT_MAX_AGE_DAYS))
    }
}

/// Outcome of checking the cache for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Nothing usable is stored.
    Miss,
    /// Something is stored but it is too old or unreadable.
    Stale,
    /// The stored result, with its `updated` stamp reattached.
    Fresh(AnalysisResult),
}

impl FreshnessPolicy {
    pub fn with_max_age(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// True when `updated` is missing, unparseable, or strictly older than the window.
    pub fn should_refresh(&self, updated: Option<&str>, now: DateTime<Utc>) -> bool {
        let Some(updated) = updated.and_then(parse_timestamp) else {
            return true;
        };
        // a window reaching past the earliest representable time covers everything
        match now.checked_sub_signed(self.max_age) {
            Some(cutoff) => updated < cutoff,
            None => false,
        }
    }

    pub fn evaluate(&self, entry: Option<CacheEntry>, now: DateTime<Utc>) -> CacheDecision {
        let Some(entry) = entry else {
            return CacheDecision::Miss;
        };
        let Some(stored) = entry.stored_result() else {
            return CacheDecision::Miss;
        };

        if self.should_refresh(entry.updated.as_deref(), now) {
            return CacheDecision::Stale;
        }

        match serde_json::from_str::<AnalysisResult>(stored) {
            Ok(mut result) => {
                result.updated = entry.updated.clone();
                CacheDecision::Fresh(result)
            }
            Err(e) => {
                warn!("Cached result for {} is unreadable, recomputing: {}", entry.url, e);
                CacheDecision::Stale
            }
        }
    }
}

/// Parses an ISO-8601 timestamp carrying an offset (`Z` or `+hh:mm`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
