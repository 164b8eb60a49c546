use crate::error::SearchError;
use crate::timekey;

/// A single measurement keyed by its canonical timestamp.
///
/// `key` is the numeric projection of `timestamp` and is cached so search
/// strategies never re-parse strings while probing.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub timestamp: String,
    pub key: f64,
    pub value: f64,
}

impl Entry {
    /// Builds an entry, projecting the timestamp onto its key.
    pub fn new(timestamp: &str, value: f64) -> Result<Self, SearchError> {
        let timestamp = timekey::canonicalize(timestamp)?;
        let key = timekey::project(&timestamp)?;
        Ok(Entry { timestamp, key, value })
    }
}

/// Read-only sequence of entries sorted ascending by key.
///
/// Built once by the loader and never mutated afterwards, so one instance can be
/// shared by reference between any number of concurrent queries. Entries with
/// equal keys keep the order in which they were supplied.
#[derive(Debug, Clone, Default)]
pub struct OrderedSeries {
    entries: Vec<Entry>,
}

impl OrderedSeries {
    /// Builds a series from entries in any order.
    ///
    /// Sorting is stable so duplicate timestamps keep their input order.
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.key.total_cmp(&b.key));
        OrderedSeries { entries }
    }

    /// Builds a series from `(timestamp, value)` pairs, validating every timestamp.
    ///
    /// # Arguments
    /// * `pairs` - Raw timestamp strings with their measurement.
    ///
    /// # Returns
    /// * `Result<OrderedSeries, SearchError>` - Sorted series, or the first `MalformedTimestamp`.
    #[cfg(test)]
    pub fn from_pairs<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Result<Self, SearchError> {
        let entries = pairs
            .into_iter()
            .map(|(ts, value)| Entry::new(ts.as_ref(), value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Key at `index`. Callers guarantee `index < len()`.
    #[inline]
    pub fn key(&self, index: usize) -> f64 {
        self.entries[index].key
    }

    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        self.entries[index].value
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Index of the first entry whose key is not less than `key`.
    pub fn lower_bound(&self, key: f64) -> usize {
        self.entries.partition_point(|e| e.key < key)
    }

    /// Exact-key lookup by timestamp.
    ///
    /// Used to join a secondary series (humidity) onto results of the primary
    /// one. With duplicate timestamps the first stored entry wins.
    ///
    /// # Returns
    /// * `Result<Option<f64>, SearchError>` - The value, `None` if absent, or `MalformedTimestamp`.
    pub fn lookup(&self, timestamp: &str) -> Result<Option<f64>, SearchError> {
        let key = timekey::project(timestamp)?;
        Ok(self.lookup_key(key))
    }

    /// Exact-key lookup by numeric key.
    pub fn lookup_key(&self, key: f64) -> Option<f64> {
        let idx = self.lower_bound(key);
        self.entries
            .get(idx)
            .filter(|e| e.key == key)
            .map(|e| e.value)
    }

    /// Entries around the position where `key` would be inserted.
    ///
    /// Returns up to `radius` entries on each side of the insertion point
    /// (the entry at the insertion point counts on the right side). Used to
    /// give context after a miss.
    pub fn nearby(&self, key: f64, radius: usize) -> &[Entry] {
        let idx = self.lower_bound(key);
        let start = idx.saturating_sub(radius);
        let end = (idx + radius).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Entries whose timestamp falls on the given calendar date (`YYYY-MM-DD`).
    pub fn on_date(&self, date: &str) -> &[Entry] {
        let start = self.entries.partition_point(|e| e.timestamp.as_str() < date);
        let len = self.entries[start..]
            .iter()
            .take_while(|e| e.timestamp.starts_with(date))
            .count();
        &self.entries[start..start + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedSeries {
        OrderedSeries::from_pairs([
            ("2024-01-01T02:00:00", 9.0),
            ("2024-01-01T00:00:00", 10.0),
            ("2024-01-02T00:00:00", 7.5),
            ("2024-01-01T01:00:00", 12.0),
        ])
        .unwrap()
    }

    #[test]
    fn sorts_by_key() {
        let series = sample();
        let stamps: Vec<_> = series.entries().iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            [
                "2024-01-01T00:00:00",
                "2024-01-01T01:00:00",
                "2024-01-01T02:00:00",
                "2024-01-02T00:00:00",
            ]
        );
        assert!(series.entries().windows(2).all(|w| w[0].key <= w[1].key));
    }

    #[test]
    fn duplicates_keep_insertion_order() {
        let series = OrderedSeries::from_pairs([
            ("2024-01-01T01:00:00", 1.0),
            ("2024-01-01T00:00:00", 0.0),
            ("2024-01-01T01:00:00", 2.0),
        ])
        .unwrap();
        let values: Vec<_> = series.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, [0.0, 1.0, 2.0]);
        assert_eq!(series.lookup("2024-01-01T01:00:00").unwrap(), Some(1.0));
    }

    #[test]
    fn rejects_malformed_pairs() {
        let err = OrderedSeries::from_pairs([("2024-01-01T00:00:00", 1.0), ("yesterday", 2.0)]).unwrap_err();
        assert!(matches!(err, SearchError::MalformedTimestamp { .. }));
    }

    #[test]
    fn exact_lookup() {
        let series = sample();
        assert_eq!(series.lookup("2024-01-01T01:00:00").unwrap(), Some(12.0));
        assert_eq!(series.lookup("2024-01-01T01:30:00").unwrap(), None);
        assert_eq!(series.lookup("2030-01-01T00:00:00").unwrap(), None);
        assert!(series.lookup("01:00").is_err());
        assert_eq!(OrderedSeries::default().lookup_key(0.0), None);
    }

    #[test]
    fn nearby_surrounds_insertion_point() {
        let series = sample();
        let key = timekey::project("2024-01-01T01:30:00").unwrap();
        let around: Vec<_> = series.nearby(key, 2).iter().map(|e| e.value).collect();
        assert_eq!(around, [10.0, 12.0, 9.0, 7.5]);

        let before_all = timekey::project("2023-01-01T00:00:00").unwrap();
        assert_eq!(series.nearby(before_all, 2).len(), 2);
        assert!(OrderedSeries::default().nearby(before_all, 2).is_empty());
    }

    #[test]
    fn on_date_selects_one_day() {
        let series = sample();
        assert_eq!(series.on_date("2024-01-01").len(), 3);
        assert_eq!(series.on_date("2024-01-02").len(), 1);
        assert!(series.on_date("2024-01-03").is_empty());
    }
}
