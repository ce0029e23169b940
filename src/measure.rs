//! Top-level measurement orchestration.
//!
//! Single invocations of a short function cannot be timed directly: the
//! timer resolution and fence overhead swamp them. Instead, a long
//! replicated input sequence is measured in full and again with `num_skip`
//! occurrences of one input left out. Subtracting the two (each first
//! corrected by the measured cost of iterating the same sequence over an
//! empty function) isolates the cost of exactly `num_skip` invocations
//! with that input, independent of loop control and sequence-memory
//! effects.

use colored::Colorize;

use crate::config::Params;
use crate::measurement::{prevent_elision, sample_until_stable};
use crate::planner::{fill_subset, num_skip, replicate_inputs, unique_inputs};
use crate::result::Measurement;
use crate::types::{Func, FuncInput, FuncOutput, Ticks};

/// Returns its input unchanged. Used to measure the cost of iterating an
/// input sequence and making a call, which is later deducted.
#[inline(never)]
fn empty_func(_arg: *const u8, input: FuncInput) -> FuncOutput {
    input
}

/// Measured cost of iterating `inputs` and calling [`empty_func`] on each.
fn overhead(arg: *const u8, inputs: &[FuncInput], p: &Params) -> Ticks {
    // Zero tolerance: only the absolute deviation floor can terminate
    // sampling of the fast empty function.
    let (duration, _rel_mad) = sample_until_stable(0.0, p, || {
        for &input in inputs {
            prevent_elision(empty_func(arg, input));
        }
    });
    duration
}

/// Total ticks elapsed running `func` over every element of `inputs`.
/// Accumulates the worst observed variability into `max_rel_mad`.
fn total_duration(
    func: Func,
    arg: *const u8,
    inputs: &[FuncInput],
    p: &Params,
    max_rel_mad: &mut f64,
) -> Ticks {
    let (duration, rel_mad) = sample_until_stable(p.target_rel_mad, p, || {
        for &input in inputs {
            prevent_elision(func(arg, input));
        }
    });
    *max_rel_mad = max_rel_mad.max(rel_mad);
    duration
}

/// Measures the per-invocation cost of `func` for each unique value in
/// `inputs`.
///
/// Writes one [`Measurement`] per unique input into the front of `results`
/// and returns how many were written (the number of unique inputs), or 0
/// if measurement failed. Failures happen when ambient noise inverts an
/// expected ordering (a longer sequence measuring cheaper than a shorter
/// one); a diagnostic goes to stderr and the caller should retry on a
/// quieter machine.
///
/// `arg` is forwarded untouched to every call of `func`; pass
/// [`std::ptr::null()`] if the function needs no context. `results` must
/// hold at least as many elements as `inputs` has unique values. Callers
/// serialize: concurrent calls would contend for the same core resources
/// and produce garbage.
///
/// An empty `inputs` slice is a caller bug: debug builds assert, release
/// builds return 0.
pub fn measure(
    func: Func,
    arg: *const u8,
    inputs: &[FuncInput],
    results: &mut [Measurement],
    p: &Params,
) -> usize {
    debug_assert!(!inputs.is_empty(), "no inputs to measure");
    if inputs.is_empty() {
        return 0;
    }

    let unique = unique_inputs(inputs);
    debug_assert!(results.len() >= unique.len());

    let num_skip = num_skip(func, arg, &unique, p);
    if num_skip == 0 {
        return 0;
    }
    let mul = 1.0f32 / num_skip as f32;

    let full = replicate_inputs(inputs, unique.len(), num_skip, p);
    let mut subset = vec![0; full.len() - num_skip];

    let overhead_full = overhead(arg, &full, p);
    let overhead_subset = overhead(arg, &subset, p);
    if overhead_full < overhead_subset {
        eprintln!(
            "{} overhead {} < {}",
            "measurement failed:".red().bold(),
            overhead_full,
            overhead_subset
        );
        return 0;
    }

    if p.verbose {
        println!(
            "#inputs={:5},{:5} overhead={:5},{:5}",
            full.len(),
            subset.len(),
            overhead_full,
            overhead_subset
        );
    }

    let mut max_rel_mad = 0.0f64;
    let total = total_duration(func, arg, &full, p, &mut max_rel_mad);

    for (i, &input) in unique.iter().enumerate() {
        fill_subset(&full, input, num_skip, &mut subset);
        let total_skip = total_duration(func, arg, &subset, p, &mut max_rel_mad);

        if total < total_skip {
            eprintln!(
                "{} total {} < {}",
                "measurement failed:".red().bold(),
                total,
                total_skip
            );
            return 0;
        }

        // Ticks attributable to num_skip invocations with this input.
        let duration = total
            .wrapping_sub(overhead_full)
            .wrapping_sub(total_skip.wrapping_sub(overhead_subset));
        results[i] = Measurement {
            input,
            ticks: duration as f32 * mul,
            variability: max_rel_mad as f32,
        };
    }

    unique.len()
}
