//! Core type aliases shared across the crate.

/// Platform-defined timer unit: CPU cycles on architectures with a cycle
/// counter, nanoseconds on the fallback clock.
///
/// Unsigned so that subtraction wraps around on counter overflow instead of
/// invoking undefined behavior.
pub type Ticks = u64;

/// Opaque 64-bit token passed to the function under test.
///
/// The engine never interprets input values; it only distinguishes them.
/// Functions typically switch on the input (a size, an index into a table of
/// test vectors) to select what work to do.
pub type FuncInput = u64;

/// Return value of the function under test.
///
/// Must depend on the computation being measured; the engine feeds it to the
/// elision barrier so the optimizer cannot delete the work that produced it.
pub type FuncOutput = u64;

/// The function under test.
///
/// Must be pure apart from reads through `arg` (a caller-owned buffer that
/// the engine itself never dereferences). Any side effect visible to the
/// optimizer distorts the measurement.
pub type Func = fn(*const u8, FuncInput) -> FuncOutput;
