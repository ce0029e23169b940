//! Input sequence planning: replication, permutation, and leave-out
//! subsets.
//!
//! The subtraction protocol measures a long randomly ordered sequence of
//! inputs twice: once in full, once with `num_skip` occurrences of a single
//! input removed. The difference attributes a cost to that input. This
//! module builds those sequences.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::Params;
use crate::measurement::{prevent_elision, sample_until_stable, timer};
use crate::types::{Func, FuncInput, Ticks};

/// Fixed seed for the permutation generators. The shuffle only needs to
/// decorrelate sequence position from input value; a fixed seed keeps runs
/// reproducible, which makes measurement artifacts debuggable.
const SHUFFLE_SEED: u64 = 0x243F_6A88_85A3_08D3;

/// Returns the distinct values of `inputs` in ascending order.
pub(crate) fn unique_inputs(inputs: &[FuncInput]) -> Vec<FuncInput> {
    let mut unique = inputs.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique
}

/// Returns how many occurrences of an input must be left out of the subset
/// sequence for its contribution to dominate timer noise.
///
/// Samples each unique input once to find the cheapest; the skip count is
/// `p.precision_divisor` divided by that duration, rounded up. Returns 0
/// only if even the cheapest input measures as zero ticks beyond the timer
/// resolution, in which case measurement cannot proceed.
pub(crate) fn num_skip(func: Func, arg: *const u8, unique: &[FuncInput], p: &Params) -> usize {
    // Minimum elapsed ticks across all unique inputs.
    let mut min_duration = Ticks::MAX;

    for &input in unique {
        let (total, _rel_mad) = sample_until_stable(p.target_rel_mad, p, || {
            prevent_elision(func(arg, input));
        });
        min_duration = min_duration.min(total.wrapping_sub(timer::timer_resolution()));
    }

    let max_skip = p.precision_divisor;
    let num_skip = if min_duration == 0 {
        0
    } else {
        ((max_skip as u64).saturating_add(min_duration - 1) / min_duration) as usize
    };
    if p.verbose {
        println!(
            "res={} max_skip={} min_dur={} num_skip={}",
            timer::timer_resolution(),
            max_skip,
            min_duration,
            num_skip
        );
    }
    num_skip
}

/// Replicates `inputs` until `num_skip` occurrences of any one input can
/// be omitted, then permutes the result.
///
/// With a single unique input no permutation is needed and the sequence is
/// just `p.subset_ratio * num_skip` copies. Otherwise the caller's sequence
/// is concatenated `p.subset_ratio * num_skip` times and shuffled with a
/// fixed-seed generator, so back-to-back calls with equal arguments yield
/// identical sequences.
pub(crate) fn replicate_inputs(
    inputs: &[FuncInput],
    num_unique: usize,
    num_skip: usize,
    p: &Params,
) -> Vec<FuncInput> {
    if num_unique == 1 {
        return vec![inputs[0]; p.subset_ratio * num_skip];
    }

    let mut full = Vec::with_capacity(p.subset_ratio * num_skip * inputs.len());
    for _ in 0..p.subset_ratio * num_skip {
        full.extend_from_slice(inputs);
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(SHUFFLE_SEED);
    full.shuffle(&mut rng);
    full
}

/// Copies `full` into `subset` in order, dropping `num_skip` randomly
/// chosen occurrences of `input_to_skip`.
///
/// `full` must contain at least `num_skip` occurrences of `input_to_skip`,
/// and `subset` must be exactly `num_skip` shorter than `full`.
///
/// The omitted occurrence indices come from a fixed-seed generator and so
/// repeat across calls. That is fine: they select the Nth occurrence of
/// `input_to_skip`, and the absolute positions of those occurrences within
/// `full` still differ between skip values.
pub(crate) fn fill_subset(
    full: &[FuncInput],
    input_to_skip: FuncInput,
    num_skip: usize,
    subset: &mut [FuncInput],
) {
    let count = full.iter().filter(|&&input| input == input_to_skip).count();
    debug_assert!(count >= num_skip);
    debug_assert_eq!(subset.len() + num_skip, full.len());

    // Which occurrences to drop: a uniform num_skip-subset of [0, count),
    // in ascending order for the single-pass scan below.
    let mut omit: Vec<u32> = (0..count as u32).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(SHUFFLE_SEED);
    omit.shuffle(&mut rng);
    omit.truncate(num_skip);
    omit.sort_unstable();

    let mut occurrence = 0u32;
    let mut idx_omit = 0;
    let mut idx_subset = 0;
    for &input in full {
        if input == input_to_skip {
            let omitted = idx_omit < omit.len() && occurrence == omit[idx_omit];
            occurrence += 1;
            if omitted {
                idx_omit += 1;
                continue;
            }
        }
        if idx_subset < subset.len() {
            subset[idx_subset] = input;
            idx_subset += 1;
        }
    }
    debug_assert_eq!(idx_subset, subset.len());
    debug_assert_eq!(idx_omit, omit.len());
    debug_assert_eq!(occurrence as usize, count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_inputs_strictly_increasing() {
        let unique = unique_inputs(&[5, 3, 5, 1, 3, 3, 8]);
        assert_eq!(unique, vec![1, 3, 5, 8]);
        for window in unique.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_unique_inputs_idempotent() {
        let once = unique_inputs(&[9, 2, 2, 7]);
        assert_eq!(unique_inputs(&once), once);
    }

    #[test]
    fn test_replicate_single_input_fast_path() {
        let p = Params::default();
        let full = replicate_inputs(&[7, 7, 7], 1, 10, &p);
        assert_eq!(full.len(), p.subset_ratio * 10);
        assert!(full.iter().all(|&input| input == 7));
    }

    #[test]
    fn test_replicate_preserves_multiset() {
        let p = Params::default();
        let inputs = [1, 2, 3];
        let num_skip = 5;
        let full = replicate_inputs(&inputs, 3, num_skip, &p);

        assert_eq!(full.len(), p.subset_ratio * num_skip * inputs.len());
        for &input in &inputs {
            let count = full.iter().filter(|&&x| x == input).count();
            assert_eq!(count, p.subset_ratio * num_skip);
        }
    }

    #[test]
    fn test_replicate_reproducible() {
        let p = Params::default();
        let a = replicate_inputs(&[4, 5, 6, 7], 4, 8, &p);
        let b = replicate_inputs(&[4, 5, 6, 7], 4, 8, &p);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_subset_counts_and_order() {
        // a=10, b=20, c=30 in the pattern [a,b,a,c,a,b,a].
        let full = [10, 20, 10, 30, 10, 20, 10];
        let mut subset = [0; 5];
        fill_subset(&full, 10, 2, &mut subset);

        assert_eq!(subset.iter().filter(|&&x| x == 10).count(), 2);
        assert_eq!(subset.iter().filter(|&&x| x == 20).count(), 2);
        assert_eq!(subset.iter().filter(|&&x| x == 30).count(), 1);

        // Relative order of the survivors is preserved: b .. c .. b.
        let non_skipped: Vec<u64> = subset.iter().copied().filter(|&x| x != 10).collect();
        assert_eq!(non_skipped, vec![20, 30, 20]);
    }

    #[test]
    fn test_fill_subset_deterministic() {
        let full = [1, 2, 1, 2, 1, 2, 1, 1];
        let mut first = [0; 5];
        let mut second = [0; 5];
        fill_subset(&full, 1, 3, &mut first);
        fill_subset(&full, 1, 3, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fill_subset_all_occurrences() {
        let full = [9, 9, 9, 9];
        let mut subset = [0; 0];
        fill_subset(&full, 9, 4, &mut subset);
    }
}
