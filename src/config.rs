//! Configuration for the measurement engine.

/// Configuration options for [`measure`](crate::measure).
///
/// The defaults are tuned for regions lasting a handful of cycles up to a
/// few microseconds, measured on an otherwise idle machine. Longer regions
/// work but waste time; raise `seconds_per_eval` proportionally instead.
#[derive(Debug, Clone)]
pub struct Params {
    /// Target duration of one evaluation round in seconds (default: 4e-3).
    ///
    /// Each round of the adaptive sampler sizes its sample count so that the
    /// round lasts roughly this long. Larger values smooth over scheduler
    /// noise at the cost of runtime.
    pub seconds_per_eval: f64,

    /// Floor on samples per round (default: 7).
    ///
    /// Keeps rounds meaningful when a single invocation already exceeds the
    /// round's tick budget.
    pub min_samples_per_eval: usize,

    /// Sample count above which the mode replaces the median as the central
    /// estimate (default: 27).
    ///
    /// The half-sample mode needs enough samples to find a dense cluster;
    /// below this threshold the median is the safer estimator.
    pub min_mode_samples: usize,

    /// Maximum number of doubling rounds in the adaptive sampler
    /// (default: 9).
    pub max_evals: usize,

    /// Relative median-absolute-deviation convergence target
    /// (default: 0.01).
    pub target_rel_mad: f64,

    /// Numerator for deriving the skip count from the shortest measured
    /// duration (default: 1024).
    ///
    /// Chosen so that `num_skip * min_duration` dwarfs the timer
    /// resolution, which makes per-input contributions resolvable after
    /// overhead subtraction.
    pub precision_divisor: usize,

    /// Oversampling factor for the replicated input sequence (default: 2).
    ///
    /// Must be at least 2 so that removing `num_skip` occurrences of one
    /// input still leaves every input represented.
    pub subset_ratio: usize,

    /// Emit diagnostic traces to stdout (default: false).
    pub verbose: bool,
}

impl Params {
    /// Sample count for the timer resolution probe.
    pub const TIMER_SAMPLES: usize = 256;
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seconds_per_eval: 4e-3,
            min_samples_per_eval: 7,
            min_mode_samples: 27,
            max_evals: 9,
            target_rel_mad: 0.01,
            precision_divisor: 1024,
            subset_ratio: 2,
            verbose: false,
        }
    }
}
