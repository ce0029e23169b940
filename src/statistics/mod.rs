//! Robust statistics for small integer timing samples.
//!
//! Timing distributions have heavy upper tails (interrupts, cache misses)
//! and often very few unique values, so the mean and standard deviation are
//! useless. This module provides:
//! - A counting sort specialized for few-unique-value inputs
//! - The half-sample mode, a mode estimator robust to skew
//! - The median and the median absolute deviation

mod robust;

pub use robust::{counting_sort, median, median_absolute_deviation, mode, mode_of_sorted};
