//! Location and spread estimators over `u64` tick samples.

use crate::types::Ticks;

/// Sorts `values` in ascending order.
///
/// Considerably faster than a comparison sort for input distributions with
/// very few unique values: tallies each unique value in a flat map, sorts
/// the uniques, then expands the counts back into the slice. Output is a
/// permutation of the input.
pub fn counting_sort(values: &mut [Ticks]) {
    // Unique values and their frequency. A linear scan beats hashing at the
    // sizes seen here.
    let mut unique: Vec<(Ticks, usize)> = Vec::new();
    for &value in values.iter() {
        match unique.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => unique.push((value, 1)),
        }
    }

    unique.sort_unstable();

    let mut written = 0;
    for (value, count) in unique {
        values[written..written + count].fill(value);
        written += count;
    }
    debug_assert_eq!(written, values.len());
}

/// Returns the index `i` in `[begin, begin + half_count)` that minimizes
/// `sorted[i + half_count] - sorted[i]`. The lowest index wins ties.
fn min_range(sorted: &[Ticks], begin: usize, half_count: usize) -> usize {
    let mut min_range = Ticks::MAX;
    let mut min_idx = 0;

    for idx in begin..begin + half_count {
        debug_assert!(sorted[idx] <= sorted[idx + half_count]);
        let range = sorted[idx + half_count] - sorted[idx];
        if range < min_range {
            min_range = range;
            min_idx = idx;
        }
    }

    min_idx
}

/// Half-sample mode of an ascending slice.
///
/// Narrows to the densest half-window until one or two candidates remain
/// (Bickel, "On a fast, robust estimator of the mode"). For highly skewed
/// distributions the mode is less affected by upper-tail outliers than the
/// median.
pub fn mode_of_sorted(sorted: &[Ticks]) -> Ticks {
    debug_assert!(!sorted.is_empty());

    let mut begin = 0;
    let mut half_count = sorted.len() / 2;
    while half_count > 1 {
        begin = min_range(sorted, begin, half_count);
        half_count >>= 1;
    }

    let x = sorted[begin];
    if half_count == 0 {
        return x;
    }
    debug_assert_eq!(half_count, 1);
    // Round-to-nearest integer average; relies on unsigned arithmetic.
    (x + sorted[begin + 1] + 1) / 2
}

/// Returns the mode. Side effect: sorts `values`.
pub fn mode(values: &mut [Ticks]) -> Ticks {
    counting_sort(values);
    mode_of_sorted(values)
}

/// Returns the median. Side effect: sorts `values`.
///
/// Odd counts return the middle element; even counts return the
/// round-half-up integer average of the two middle elements.
pub fn median(values: &mut [Ticks]) -> Ticks {
    debug_assert!(!values.is_empty());
    values.sort_unstable();
    let half = values.len() / 2;
    if values.len() % 2 == 1 {
        return values[half];
    }
    (values[half - 1] + values[half] + 1) / 2
}

/// Median absolute deviation of `values` from `center`, a robust measure of
/// variability. The input slice is left unmodified.
pub fn median_absolute_deviation(values: &[Ticks], center: Ticks) -> Ticks {
    debug_assert!(!values.is_empty());
    // Signed arithmetic so deviations below the center do not underflow.
    let mut abs_deviations: Vec<Ticks> = values
        .iter()
        .map(|&value| (value as i64 - center as i64).unsigned_abs())
        .collect();
    median(&mut abs_deviations)
}
