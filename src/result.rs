//! Measurement result types.

use serde::{Deserialize, Serialize};

use crate::types::FuncInput;

/// Per-input cost estimate produced by [`measure`](crate::measure).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// The input value this estimate belongs to.
    pub input: FuncInput,

    /// Estimated cost of one invocation of the function with this input, in
    /// timer ticks. Divide by
    /// [`invariant_ticks_per_second`](crate::invariant_ticks_per_second) for
    /// seconds, where that conversion is available.
    pub ticks: f32,

    /// Worst relative median absolute deviation observed across the
    /// measurements that contributed to this estimate. A health indicator:
    /// values well above the configured target mean the estimate is noisy.
    pub variability: f32,
}
