//! Canonical list of one facet type plus its provenance buckets

use crate::types::{NormalizedKey, Provenance};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Canonical, deduplicated facet list with an append-only provenance list
/// per normalized value
///
/// Values are never removed. Provenance is never deduplicated: every
/// confirmation, even a repeat from the same source, adds an entry.
#[derive(Debug, Clone)]
pub struct FacetLedger<F, P> {
    values: Vec<F>,
    provenance: HashMap<String, Vec<P>>,
}

impl<F, P> Default for FacetLedger<F, P> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            provenance: HashMap::new(),
        }
    }
}

impl<F: NormalizedKey, P> FacetLedger<F, P> {
    /// Seed from user-authored values, each with an empty provenance bucket
    pub fn seeded(values: Vec<F>) -> Self {
        let mut ledger = Self::default();
        for value in values {
            ledger.provenance.entry(value.normalized_key()).or_default();
            ledger.values.push(value);
        }
        ledger
    }

    /// Record that a source returned `value`
    ///
    /// Appends `value` to the canonical list if no equal value is present.
    /// Returns `true` when the value was new.
    pub fn confirm(&mut self, value: F, provenance: P) -> bool {
        let key = value.normalized_key();
        let is_new = !self.provenance.contains_key(&key);
        if is_new {
            self.values.push(value);
        }
        self.provenance.entry(key).or_default().push(provenance);
        is_new
    }

    /// Append provenance for an existing value only
    ///
    /// Returns `false` and drops `provenance` if `key` is not canonical.
    pub fn attach(&mut self, key: &str, provenance: P) -> bool {
        match self.provenance.get_mut(key) {
            Some(bucket) => {
                bucket.push(provenance);
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.provenance.contains_key(key)
    }

    /// Mutable access to the canonical value for `key`
    pub fn value_mut(&mut self, key: &str) -> Option<&mut F> {
        self.values.iter_mut().find(|v| v.normalized_key() == key)
    }

    /// Provenance list for `value`; empty if the value was never confirmed
    pub fn provenance(&self, value: &F) -> &[P] {
        self.provenance
            .get(&value.normalized_key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical values with their provenance, in canonical order
    pub fn entries(&self) -> impl Iterator<Item = (&F, &[P])> + '_ {
        self.values.iter().map(|v| (v, self.provenance(v)))
    }

    pub fn into_values(self) -> Vec<F> {
        self.values
    }
}

impl<F: NormalizedKey, P: Provenance> FacetLedger<F, P> {
    /// Most recent fetch date recorded for `source_name` on any value
    pub fn recent_update_from(&self, source_name: &str) -> Option<DateTime<Utc>> {
        self.provenance
            .values()
            .flatten()
            .filter(|p| p.is_from(source_name))
            .map(|p| p.recent_update_date())
            .max()
    }

    /// Whether any value carries an entry from `source_name`
    pub fn has_provenance_from(&self, source_name: &str) -> bool {
        self.provenance
            .values()
            .flatten()
            .any(|p| p.is_from(source_name))
    }

    /// Oldest per-value latest date from `source_name`
    ///
    /// `Some(None)` when at least one canonical value has no entry from the
    /// source; `None` when the ledger is empty.
    pub fn oldest_coverage_from(&self, source_name: &str) -> Option<Option<DateTime<Utc>>> {
        if self.values.is_empty() {
            return None;
        }

        let mut oldest: Option<DateTime<Utc>> = None;
        for (_, bucket) in self.entries() {
            let latest = bucket
                .iter()
                .filter(|p| p.is_from(source_name))
                .map(|p| p.recent_update_date())
                .max();
            match latest {
                None => return Some(None),
                Some(date) => {
                    oldest = Some(oldest.map_or(date, |o| o.min(date)));
                }
            }
        }
        Some(oldest)
    }
}
