//! Measurement infrastructure: fenced tick reads, optimization barriers,
//! and the adaptive sampler.
//!
//! This module provides:
//! - [`timer`] - platform-specific tick reads with explicit ordering fences
//! - [`prevent_elision`] - keeps measured computations alive past the
//!   optimizer
//! - `sample_until_stable` (crate-internal) - repeats a closure until its
//!   tick cost estimate is stable

mod barrier;
mod sampler;
pub mod timer;

pub use barrier::{prevent_elision, unpredictable_1};
pub(crate) use sampler::sample_until_stable;
pub use timer::{invariant_ticks_per_second, now, timer_resolution};
