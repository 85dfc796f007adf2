//! Polled resource snapshots and their local optimistic edits.
//!
//! A [`ResourceStore`] holds the last snapshot returned by a poll. Each poll
//! replaces it wholesale. Between polls, user-initiated mutations that the
//! backend already accepted are applied locally with [`ResourceStore::patch_upsert`]
//! and [`ResourceStore::patch_remove`]; the next poll overwrites them with
//! server-confirmed state.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::time::Instant;

use tracing::debug;

/// Mapping from identifier to resource, as returned by one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Snapshot<T> {
    pub fn new(entries: BTreeMap<String, T>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> From<BTreeMap<String, T>> for Snapshot<T> {
    fn from(entries: BTreeMap<String, T>) -> Self {
        Self::new(entries)
    }
}

impl<T, K: Into<String>> FromIterator<(K, T)> for Snapshot<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// What a resource table should show.
#[derive(Debug, PartialEq, Eq)]
pub enum ResourceView<'a, T> {
    /// No fetch has succeeded yet.
    Loading,
    /// The last fetch returned nothing, e.g. "No users".
    Empty { label: String },
    Table(&'a Snapshot<T>),
}

/// Latest snapshot of one resource kind plus local patches.
#[derive(Debug)]
pub struct ResourceStore<T> {
    label: &'static str,
    snapshot: Option<Snapshot<T>>,
    last_refresh: Option<Instant>,
}

impl<T> ResourceStore<T> {
    /// `label` is the plural resource name, e.g. "Users".
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            snapshot: None,
            last_refresh: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Swap in a freshly polled snapshot, discarding any local patches.
    pub fn replace(&mut self, snapshot: Snapshot<T>) {
        debug!(
            event = "core.snapshot.replaced",
            resource = self.label,
            count = snapshot.len()
        );
        self.snapshot = Some(snapshot);
        self.last_refresh = Some(Instant::now());
    }

    /// Insert or overwrite one entry locally.
    ///
    /// Does nothing before the first snapshot arrives: there is no table to
    /// patch yet and the next poll will carry the entry anyway.
    pub fn patch_upsert(&mut self, id: impl Into<String>, value: T) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.entries.insert(id.into(), value);
        }
    }

    /// Remove one entry locally. Same pre-snapshot rule as [`Self::patch_upsert`].
    pub fn patch_remove(&mut self, id: &str) -> Option<T> {
        self.snapshot.as_mut()?.entries.remove(id)
    }

    pub fn snapshot(&self) -> Option<&Snapshot<T>> {
        self.snapshot.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.snapshot.as_ref()?.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn view(&self) -> ResourceView<'_, T> {
        match &self.snapshot {
            None => ResourceView::Loading,
            Some(snapshot) if snapshot.is_empty() => ResourceView::Empty {
                label: format!("No {}", self.label.to_lowercase()),
            },
            Some(snapshot) => ResourceView::Table(snapshot),
        }
    }
}
