use crate::series::{Entry, OrderedSeries};

/// An entry returned by a nearest-neighbour query, with its key distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub entry: &'a Entry,
    pub distance: f64,
}

/// Returns the `k` entries whose keys are closest to `target`.
///
/// Results are ordered by ascending `|key - target|`; equal distances keep
/// series order. The target does not need to exist in the series. Every
/// distance is computed and sorted, so the cost is O(n log n).
///
/// # Arguments
/// * `series` - Sorted series to scan.
/// * `target` - Numeric key to measure distances from.
/// * `k` - Maximum number of neighbours; `k > n` returns every entry.
///
/// # Returns
/// * `Vec<Neighbor>` - Up to `min(k, n)` neighbours.
pub fn nearest(series: &OrderedSeries, target: f64, k: usize) -> Vec<Neighbor<'_>> {
    if k == 0 {
        return Vec::new();
    }
    let mut neighbors: Vec<Neighbor> = series
        .entries()
        .iter()
        .map(|entry| Neighbor { entry, distance: (entry.key - target).abs() })
        .collect();
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbors.truncate(k);
    neighbors
}
