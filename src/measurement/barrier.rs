//! Optimization barriers.
//!
//! The function under test returns a value precisely so that the work
//! producing it is observable; without a consumer the optimizer deletes the
//! whole call. [`prevent_elision`] is that consumer.

use crate::measurement::timer;
use crate::types::FuncOutput;

/// Consumes `output` so the computation that produced it cannot be elided.
///
/// On architectures with stable inline assembly this compiles to zero
/// instructions: the value is constrained to a register as read-and-written
/// and the statement carries a memory clobber, so neither the value nor
/// stores feeding it can be optimized away. Elsewhere a relaxed store to a
/// process-wide sink serves the same purpose at the cost of one store.
#[inline]
pub fn prevent_elision(output: FuncOutput) {
    #[cfg(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    ))]
    {
        let mut value = output;
        unsafe {
            std::arch::asm!("/* {0} */", inout(reg) value, options(nostack));
        }
    }

    #[cfg(not(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )))]
    {
        use std::sync::atomic::{AtomicU64, Ordering};
        static SINK: AtomicU64 = AtomicU64::new(0);
        SINK.store(output, Ordering::Relaxed);
    }
}

/// Returns 1 in a way the optimizer cannot prove constant.
///
/// Useful for hiding branches or loop bounds from constant folding in
/// caller-side benchmark functions.
#[inline]
pub fn unpredictable_1() -> i32 {
    (timer::start() != u64::MAX) as i32
}
