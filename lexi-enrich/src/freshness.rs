//! Staleness of cached source data
//!
//! Each (word, facet kind, source) is `Fresh`, `Stale` or `Absent` depending
//! on when that source last contributed to that facet kind.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// Default staleness window in days
pub const DEFAULT_STALENESS_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched within the staleness window
    Fresh,
    /// Fetched, but longer ago than the staleness window
    Stale,
    /// Never fetched from this source
    Absent,
}

impl Freshness {
    /// Classify a source's most recent fetch date against `now`
    pub fn classify(
        recent_update_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        staleness_days: i64,
    ) -> Self {
        match recent_update_date {
            None => Freshness::Absent,
            Some(date) if days_between(date, now) > staleness_days => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    /// Only stale or absent data triggers a network fetch
    pub fn needs_fetch(&self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

/// Whole days elapsed from `from` to `to`
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// Whole calendar months elapsed from `from` to `to`
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    if to < from {
        return -months_between(to, from);
    }

    let mut months = (to.year() - from.year()) as i64 * 12 + to.month() as i64 - from.month() as i64;
    if (to.day(), to.time()) < (from.day(), from.time()) {
        months -= 1;
    }
    months
}

/// Source of "now" for staleness decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
