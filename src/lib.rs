//! # nanotick
//!
//! Nanosecond-scale microbenchmark engine: measures the per-invocation
//! cost of a very short function `f(arg, input)` for a set of input
//! values, resolving differences smaller than the native timer resolution.
//!
//! Three subsystems cooperate:
//! - Fenced tick reads (`lfence; rdtsc; lfence` / `rdtscp; lfence` on
//!   x86_64) so the measured region has sharp edges
//! - Robust statistics (half-sample mode, median, median absolute
//!   deviation) suited to heavy-tailed timing distributions with few
//!   unique values
//! - A subtractive protocol: a long replicated input sequence is measured
//!   in full and with some occurrences of one input left out, and the
//!   difference, corrected for measured overhead, is attributed to that
//!   input
//!
//! ## Quick start
//!
//! ```ignore
//! use nanotick::{measure, FuncInput, FuncOutput, Measurement, Params};
//!
//! fn shift(_arg: *const u8, input: FuncInput) -> FuncOutput {
//!     input << 1
//! }
//!
//! let inputs = [1, 128, 65536];
//! let mut results = [Measurement::default(); 3];
//! let num = measure(shift, std::ptr::null(), &inputs, &mut results, &Params::default());
//! for result in &results[..num] {
//!     println!("input {:>8}: {:.2} ticks (±{:.1}%)",
//!              result.input, result.ticks, result.variability * 100.0);
//! }
//! ```
//!
//! ## Common pitfall: side effects in the measured function
//!
//! The function under test must be pure apart from reads through `arg`.
//! Its return value must depend on the work performed - the engine feeds
//! the result to [`prevent_elision`], and work that does not flow into the
//! result is deleted by the optimizer and measured as free.
//!
//! ## Caveats
//!
//! - Results are in *ticks*. [`invariant_ticks_per_second`] gives a
//!   nominal conversion where the platform exposes one; the engine does
//!   not compensate for frequency scaling.
//! - Calls to [`measure`] must be serialized by the caller, and `arg` and
//!   the inputs must not be mutated during a call.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod measure;
mod planner;
mod result;
mod types;

pub mod measurement;
pub mod statistics;

pub use config::Params;
pub use measure::measure;
pub use measurement::{
    invariant_ticks_per_second, now, prevent_elision, timer_resolution, unpredictable_1,
};
pub use result::Measurement;
pub use types::{Func, FuncInput, FuncOutput, Ticks};
