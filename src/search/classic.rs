use crate::search::SearchOutcome;
use crate::series::OrderedSeries;

/// Window size below which the exponential variant switches to bisection.
const BISECTION_THRESHOLD: isize = 5;

/// Binary search over the key projection (BIS).
///
/// Probes the midpoint of `[low, high]`. When both ends of the window carry
/// the same key the window is degenerate: `low` is probed and, on a mismatch,
/// the whole window is exhausted at once since every key in it is equal.
///
/// One step is one loop iteration. With duplicate keys the first entry hit by
/// bisection order is returned.
///
/// # Arguments
/// * `series` - Sorted series to probe.
/// * `target` - Numeric key to find.
///
/// # Returns
/// * `SearchOutcome` - Value and steps; empty series is a miss with 0 steps.
pub fn bis(series: &OrderedSeries, target: f64) -> SearchOutcome {
    let mut low: isize = 0;
    let mut high: isize = series.len() as isize - 1;
    let mut steps = 0;

    while low <= high {
        steps += 1;
        let (lo, hi) = (low as usize, high as usize);
        let degenerate = series.key(hi) == series.key(lo);
        let pos = if degenerate { lo } else { lo + (hi - lo) / 2 };
        let key = series.key(pos);

        if key == target {
            return SearchOutcome::hit(series, pos, steps);
        }
        if degenerate {
            break;
        }
        if key < target {
            low = pos as isize + 1;
        } else {
            high = pos as isize - 1;
        }
    }

    SearchOutcome::miss(steps)
}

/// Interpolation search with sqrt-sized jump re-centering.
///
/// Each outer iteration (one step):
/// 1. Misses immediately if `target` lies outside `[key[low], key[high]]`.
/// 2. Interpolates `pos = low + floor(size * (target - key[low]) / (key[high] - key[low]))`,
///    clamped to the window; a zero-width key range probes `low`.
/// 3. Windows of at most 3 entries are scanned linearly.
/// 4. Otherwise jumps from `pos` towards the target in blocks of `floor(sqrt(size))`
///    and narrows the window to the block that brackets it.
///
/// Inner jumps are not counted as steps. With duplicate keys the first entry
/// hit in interpolation order is returned.
pub fn jump_interpolation(series: &OrderedSeries, target: f64) -> SearchOutcome {
    if series.is_empty() {
        return SearchOutcome::miss(0);
    }
    let mut low = 0usize;
    let mut high = series.len() - 1;
    let mut steps = 0;

    while low <= high {
        steps += 1;
        let size = high - low + 1;
        let low_key = series.key(low);
        let high_key = series.key(high);
        if target < low_key || target > high_key {
            return SearchOutcome::miss(steps);
        }

        let pos = if high_key == low_key {
            low
        } else {
            let offset = (size as f64 * (target - low_key) / (high_key - low_key)).floor() as usize;
            (low + offset).clamp(low, high)
        };
        let pos_key = series.key(pos);
        if pos_key == target {
            return SearchOutcome::hit(series, pos, steps);
        }

        if size <= 3 {
            return match (low..=high).find(|&i| series.key(i) == target) {
                Some(i) => SearchOutcome::hit(series, i, steps),
                None => SearchOutcome::miss(steps),
            };
        }

        let block = (size as f64).sqrt().floor() as usize;
        if target > pos_key {
            let mut i = 0;
            while pos + (i + 1) * block <= high && target > series.key(pos + (i + 1) * block) {
                i += 1;
            }
            low = pos + i * block;
            high = (pos + (i + 1) * block).min(high);
        } else {
            let mut i = 0;
            while pos >= low + (i + 1) * block && target < series.key(pos - (i + 1) * block) {
                i += 1;
            }
            high = pos - i * block;
            low = pos.saturating_sub((i + 1) * block).max(low);
        }
    }

    SearchOutcome::miss(steps)
}

/// Interpolation search with exponential galloping (BIS*).
///
/// After each interpolated probe the search gallops away from `pos` with a
/// doubling stride (1, 2, 4, ...) until the target is bracketed, then narrows
/// the window to that bracket. Once the window spans fewer than 5 positions
/// it finishes with plain bisection.
///
/// One step is one interpolation round or one bisection iteration.
pub fn exponential_interpolation(series: &OrderedSeries, target: f64) -> SearchOutcome {
    let mut left: isize = 0;
    let mut right: isize = series.len() as isize - 1;
    let mut steps = 0;
    let key = |i: isize| series.key(i as usize);

    while left <= right {
        steps += 1;
        let left_key = key(left);
        let right_key = key(right);
        if target < left_key || target > right_key {
            return SearchOutcome::miss(steps);
        }
        if left_key == right_key {
            return if target == left_key {
                SearchOutcome::hit(series, left as usize, steps)
            } else {
                SearchOutcome::miss(steps)
            };
        }

        let offset = ((right - left) as f64 * (target - left_key) / (right_key - left_key)) as isize;
        let pos = (left + offset).clamp(left, right);
        let pos_key = key(pos);
        if pos_key == target {
            return SearchOutcome::hit(series, pos as usize, steps);
        }

        let mut stride = 1;
        if pos_key < target {
            let mut i = pos + 1;
            while i <= right && key(i) < target {
                i += stride;
                stride *= 2;
            }
            left = (i - stride / 2).max(pos + 1);
            right = i.min(right);
        } else {
            let mut i = pos - 1;
            while i >= left && key(i) > target {
                i -= stride;
                stride *= 2;
            }
            right = (i + stride / 2).min(pos - 1);
            left = i.max(left);
        }

        if right - left < BISECTION_THRESHOLD {
            while left <= right {
                steps += 1;
                let mid = left + (right - left) / 2;
                let mid_key = key(mid);
                if mid_key == target {
                    return SearchOutcome::hit(series, mid as usize, steps);
                }
                if mid_key < target {
                    left = mid + 1;
                } else {
                    right = mid - 1;
                }
            }
            return SearchOutcome::miss(steps);
        }
    }

    SearchOutcome::miss(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing;
    use crate::timekey;

    use rand::{Rng, SeedableRng};

    type SearchFn = fn(&OrderedSeries, f64) -> SearchOutcome;

    const ALL: [(&str, SearchFn); 3] = [
        ("bis", bis),
        ("jump", jump_interpolation),
        ("exponential", exponential_interpolation),
    ];

    #[test]
    fn bis_hourly_example() {
        let series = testing::hourly();
        let hit = bis(&series, timekey::project("2024-01-01T01:00:00").unwrap());
        assert_eq!(hit.value, Some(12.0));
        assert_eq!(hit.steps, 1);

        let miss = bis(&series, timekey::project("2024-01-01T03:00:00").unwrap());
        assert_eq!(miss.value, None);
        assert!(miss.steps >= 1);
    }

    #[test]
    fn empty_series_misses_without_steps() {
        let empty = OrderedSeries::default();
        for (name, search) in ALL {
            let outcome = search(&empty, 42.0);
            assert_eq!(outcome, SearchOutcome::miss(0), "{}", name);
        }
    }

    #[test]
    fn finds_every_present_key() {
        for seed in 0..8 {
            let series = testing::random(seed, 1 + seed as usize * 97);
            for entry in series.entries() {
                for (name, search) in ALL {
                    let outcome = search(&series, entry.key);
                    let index = outcome.index.unwrap_or_else(|| panic!("{} missed {}", name, entry.key));
                    assert_eq!(series.key(index), entry.key, "{}", name);
                    assert_eq!(outcome.value, Some(series.value(index)), "{}", name);
                }
            }
        }
    }

    #[test]
    fn misses_absent_keys() {
        let series = testing::regular(500, 60.0);
        let first = series.key(0);
        let last = series.key(series.len() - 1);
        for (name, search) in ALL {
            assert!(!search(&series, first - 1.0).is_hit(), "{}", name);
            assert!(!search(&series, last + 1.0).is_hit(), "{}", name);
            assert!(!search(&series, first + 30.0).is_hit(), "{}", name);
            assert!(!search(&series, last - 0.5).is_hit(), "{}", name);
        }
    }

    #[test]
    fn all_equal_keys_terminate() {
        let series = testing::regular(64, 0.0);
        let key = series.key(0);
        for (name, search) in ALL {
            assert!(search(&series, key).is_hit(), "{}", name);
            let below = search(&series, key - 1.0);
            let above = search(&series, key + 1.0);
            assert!(!below.is_hit() && !above.is_hit(), "{}", name);
            assert!(below.steps <= 2 && above.steps <= 2, "{}", name);
        }
    }

    #[test]
    fn bis_steps_are_logarithmic() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for n in [1usize, 2, 3, 10, 100, 1_000, 10_000] {
            let series = testing::random(n as u64, n);
            let bound = (n as f64).log2().floor() as u32 + 2;
            for _ in 0..200 {
                let idx = rng.random_range(0..n);
                let target = series.key(idx) + rng.random_range(0..2) as f64 * 0.5;
                let outcome = bis(&series, target);
                assert!(outcome.steps <= bound, "n={} steps={} bound={}", n, outcome.steps, bound);
            }
        }
    }

    #[test]
    fn jump_steps_are_bounded() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for n in [4usize, 16, 100, 1_000, 10_000] {
            let series = testing::random(n as u64 + 100, n);
            let bound = (n as f64).log2().ceil() as u32 + 3;
            for _ in 0..200 {
                let idx = rng.random_range(0..n);
                let target = series.key(idx) + rng.random_range(0..2) as f64 * 0.5;
                let outcome = jump_interpolation(&series, target);
                assert!(outcome.steps <= bound, "n={} steps={} bound={}", n, outcome.steps, bound);
            }
        }
    }

    #[test]
    fn uniform_keys_are_found_on_first_probe() {
        let series = testing::regular(1_000, 60.0);
        for idx in [0, 1, 250, 999] {
            let outcome = jump_interpolation(&series, series.key(idx));
            assert_eq!(outcome.index, Some(idx));
            assert_eq!(outcome.steps, 1);
        }
    }

    #[test]
    fn repeated_searches_are_identical() {
        let series = testing::random(3, 300);
        let target = series.key(123);
        for (name, search) in ALL {
            assert_eq!(search(&series, target), search(&series, target), "{}", name);
        }
    }
}
