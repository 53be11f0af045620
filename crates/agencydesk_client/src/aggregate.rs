//! Client-side derived counters (folder item counts) with authoritative repair.

use std::collections::HashMap;
use std::hash::Hash;

/// Per-container counters kept approximately correct between refreshes.
///
/// A count is an authoritative base plus the deltas of operations still in
/// flight. Reconciling replaces the base only, so a refetch that ran before
/// an operation finished cannot erase that operation's delta.
#[derive(Debug, Clone)]
pub struct AggregateCounter<K> {
    counts: HashMap<K, usize>,
    in_flight: HashMap<K, i64>,
}

impl<K> Default for AggregateCounter<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> AggregateCounter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the base counter for `key` by `delta`, floored at zero.
    ///
    /// # Returns
    /// The new count.
    pub fn bump(&mut self, key: &K, delta: i64) -> usize {
        let count = self.counts.entry(key.clone()).or_insert(0);
        let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        *count = if delta < 0 {
            count.saturating_sub(magnitude)
        } else {
            count.saturating_add(magnitude)
        };
        self.get(key)
    }

    /// Record the delta of an operation that has not completed yet.
    ///
    /// # Returns
    /// The count shown with the delta applied.
    pub fn hold(&mut self, key: &K, delta: i64) -> usize {
        let pending = self.in_flight.entry(key.clone()).or_insert(0);
        *pending = pending.saturating_add(delta);
        self.get(key)
    }

    /// Drop a held delta after its operation failed.
    pub fn release(&mut self, key: &K, delta: i64) -> usize {
        if let Some(pending) = self.in_flight.get_mut(key) {
            *pending = pending.saturating_sub(delta);
            if *pending == 0 {
                self.in_flight.remove(key);
            }
        }
        self.get(key)
    }

    /// Move a held delta into the base after its operation succeeded.
    ///
    /// Any later reconcile overrides the base as usual.
    pub fn commit(&mut self, key: &K, delta: i64) -> usize {
        self.release(key, delta);
        self.bump(key, delta)
    }

    /// Current count for `key`; unknown keys read as zero.
    pub fn get(&self, key: &K) -> usize {
        let base = self.counts.get(key).copied().unwrap_or(0);
        let pending = self.in_flight.get(key).copied().unwrap_or(0);
        let magnitude = usize::try_from(pending.unsigned_abs()).unwrap_or(usize::MAX);
        if pending < 0 {
            base.saturating_sub(magnitude)
        } else {
            base.saturating_add(magnitude)
        }
    }

    /// Discard every base counter and rebuild from an authoritative fetch.
    ///
    /// # Errors
    /// Returns the fetch error unchanged; counters are left as they were.
    pub fn reconcile<E, F>(&mut self, fetch_all: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<Vec<(K, usize)>, E>,
    {
        let fresh = fetch_all()?;
        self.reconcile_from(fresh);
        Ok(())
    }

    /// Rebuild the base from counts that were fetched elsewhere.
    ///
    /// Held deltas stay applied on top.
    pub fn reconcile_from(&mut self, counts: impl IntoIterator<Item = (K, usize)>) {
        self.counts = counts.into_iter().collect();
    }

    /// Number of keys with a delta still held.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_never_go_negative() {
        let mut counter = AggregateCounter::new();
        let key = "f1".to_string();
        let deltas = [1, -1, -1, -5, 2, -3, 1, i64::MIN, 4];
        for delta in deltas {
            counter.bump(&key, delta);
            // usize cannot be negative; the floor shows up as zero rather than wrap.
            assert!(counter.get(&key) < 100);
        }
        assert_eq!(counter.get(&key), 4);
        assert_eq!(counter.bump(&key, -10), 0);
    }

    #[test]
    fn reconcile_discards_local_drift() {
        let mut counter = AggregateCounter::new();
        counter.bump(&"f1", 3);
        counter.bump(&"stale", 1);

        counter
            .reconcile(|| Ok::<_, String>(vec![("f1", 1), ("f2", 7)]))
            .expect("reconcile");

        assert_eq!(counter.get(&"f1"), 1);
        assert_eq!(counter.get(&"f2"), 7);
        assert_eq!(counter.get(&"stale"), 0);
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn failed_reconcile_keeps_counters() {
        let mut counter = AggregateCounter::new();
        counter.bump(&"f1", 2);
        let err = counter
            .reconcile(|| Err::<Vec<(&str, usize)>, _>("offline"))
            .expect_err("should fail");
        assert_eq!(err, "offline");
        assert_eq!(counter.get(&"f1"), 2);
    }

    #[test]
    fn reconcile_keeps_held_deltas() {
        let mut counter = AggregateCounter::new();
        counter.reconcile_from(vec![("f1", 1)]);
        assert_eq!(counter.hold(&"f1", 1), 2);

        // A refetch that ran before the upload finished.
        counter.reconcile_from(vec![("f1", 1)]);
        assert_eq!(counter.get(&"f1"), 2);

        assert_eq!(counter.release(&"f1", 1), 1);
        assert_eq!(counter.in_flight_len(), 0);
    }

    #[test]
    fn commit_folds_delta_into_base() {
        let mut counter = AggregateCounter::new();
        counter.reconcile_from(vec![("f1", 2), ("f2", 0)]);
        counter.hold(&"f1", -1);
        counter.hold(&"f2", 1);
        assert_eq!((counter.get(&"f1"), counter.get(&"f2")), (1, 1));

        counter.commit(&"f1", -1);
        counter.commit(&"f2", 1);
        assert_eq!((counter.get(&"f1"), counter.get(&"f2")), (1, 1));
        assert_eq!(counter.in_flight_len(), 0);

        counter.reconcile_from(vec![("f1", 1), ("f2", 1)]);
        assert_eq!((counter.get(&"f1"), counter.get(&"f2")), (1, 1));
    }

    #[test]
    fn held_decrement_floors_at_zero() {
        let mut counter = AggregateCounter::new();
        assert_eq!(counter.hold(&"f1", -3), 0);
        assert_eq!(counter.release(&"f1", -3), 0);
    }
}
