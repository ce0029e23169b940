//! Adaptive sampling until the variability target is met.

use colored::Colorize;

use crate::config::Params;
use crate::measurement::timer;
use crate::statistics::{median, median_absolute_deviation, mode};
use crate::types::Ticks;

/// Estimates the tick cost of one invocation of `lambda`, growing the
/// sample count until the variability drops below `max_rel_mad`.
///
/// Returns `(estimate, rel_mad)` where `rel_mad` is the observed median
/// absolute deviation divided by the estimate.
///
/// The first invocation seeds the per-round sample budget so that each
/// round lasts roughly `p.seconds_per_eval`. Rounds double the budget until
/// either the relative deviation meets `max_rel_mad`, a small absolute
/// deviation floor is reached (a percentage target is too strict for
/// estimates near the timer resolution), or `p.max_evals` rounds pass. In
/// the last case the final estimate is returned anyway and the caller sees
/// the residual `rel_mad`; verbose mode prints a warning.
///
/// The central estimate is the half-sample mode once at least
/// `p.min_mode_samples` samples exist, otherwise the median.
///
/// # Panics
///
/// Panics if a central estimate of zero ticks is computed, which indicates
/// a degenerate timer on this platform.
pub(crate) fn sample_until_stable<F>(max_rel_mad: f64, p: &Params, mut lambda: F) -> (Ticks, f64)
where
    F: FnMut(),
{
    // Seed the sample budget from a single estimated duration.
    let t0 = timer::start();
    lambda();
    let t1 = timer::stop();
    let mut est = t1.wrapping_sub(t0);

    let ticks_per_eval = (timer::invariant_ticks_per_second() * p.seconds_per_eval) as u64;
    let mut samples_per_eval = if est == 0 {
        p.min_samples_per_eval
    } else {
        ((ticks_per_eval / est) as usize).max(p.min_samples_per_eval)
    };

    let mut samples: Vec<Ticks> = Vec::with_capacity(1 + samples_per_eval);
    samples.push(est);

    // A percentage is too strict for tiny estimates, so a small absolute
    // median absolute deviation also counts as converged.
    let max_abs_mad = (timer::timer_resolution() + 99) / 100;
    let mut rel_mad = 0.0;

    for _eval in 0..p.max_evals {
        samples.reserve(samples_per_eval);
        for _ in 0..samples_per_eval {
            let t0 = timer::start();
            lambda();
            let t1 = timer::stop();
            samples.push(t1.wrapping_sub(t0));
        }

        est = if samples.len() >= p.min_mode_samples {
            mode(&mut samples)
        } else {
            // With few samples the median is the safer estimator.
            median(&mut samples)
        };
        assert!(est != 0, "degenerate timer read: zero central estimate");

        let abs_mad = median_absolute_deviation(&samples, est);
        rel_mad = abs_mad as f64 / est as f64;

        if rel_mad <= max_rel_mad || abs_mad <= max_abs_mad {
            if p.verbose {
                println!(
                    "{:6} samples => {:5} (abs_mad={:4}, rel_mad={:5.2}%)",
                    samples.len(),
                    est,
                    abs_mad,
                    rel_mad * 100.0
                );
            }
            return (est, rel_mad);
        }

        samples_per_eval *= 2;
    }

    if p.verbose {
        println!(
            "{} rel_mad={:.2}% still exceeds {:.2}% after {} samples",
            "WARNING:".yellow().bold(),
            rel_mad * 100.0,
            max_rel_mad * 100.0,
            samples.len()
        );
    }
    (est, rel_mad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::prevent_elision;

    fn spin(iterations: u64) -> u64 {
        let mut acc = iterations;
        for i in 0..iterations {
            acc = acc.wrapping_mul(6364136223846793005).wrapping_add(i);
        }
        acc
    }

    #[test]
    fn test_estimate_is_nonzero() {
        let p = Params::default();
        let (est, _rel_mad) = sample_until_stable(1.0, &p, || {
            prevent_elision(spin(500));
        });
        assert!(est > 0);
    }

    #[test]
    fn test_loose_tolerance_converges() {
        let p = Params::default();
        // A deterministic spin with a generous tolerance must converge
        // without exhausting the doubling rounds, so rel_mad is within it.
        let (est, rel_mad) = sample_until_stable(10.0, &p, || {
            prevent_elision(spin(2_000));
        });
        assert!(est > 0);
        assert!(rel_mad <= 10.0, "rel_mad {rel_mad} above loose tolerance");
    }

    #[test]
    fn test_longer_work_measures_longer() {
        let p = Params::default();
        let (short, _) = sample_until_stable(0.25, &p, || {
            prevent_elision(spin(200));
        });
        let (long, _) = sample_until_stable(0.25, &p, || {
            prevent_elision(spin(20_000));
        });
        assert!(
            long > short,
            "100x the work measured {long} <= {short} ticks"
        );
    }
}
