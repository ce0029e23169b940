//! Platform-specific high-resolution tick reads.
//!
//! Provides fenced [`start`]/[`stop`] reads bracketing a measured region:
//! - **x86_64**: `lfence; rdtsc; lfence` / `rdtscp; lfence`
//! - **aarch64**: `isb; mrs cntvct_el0` (virtual counter)
//! - **riscv64**: `rdcycle`
//! - **Fallback**: monotonic nanoseconds via `std::time::Instant`
//!
//! The fallback covers every architecture outside Rust's stabilized
//! inline-asm set, so the crate builds on a stable toolchain everywhere.
//!
//! # Why two read functions
//!
//! `rdtsc` is not serializing: earlier instructions may retire after it and
//! later instructions before it, so an unfenced read pair measures a region
//! with fuzzy edges. `lfence` waits for all earlier instructions to
//! complete and holds back later ones, which makes it usable as a cheap
//! full fence around the counter read. At region start we fence on both
//! sides of `rdtsc` so preceding work cannot leak in and the timestamp is
//! captured before the region begins. At region end, `rdtscp` already
//! waits for the region's instructions to retire before reading, so only a
//! trailing `lfence` is needed to keep subsequent instructions out of the
//! region. The start-side fences make an `rdtscp` at region start
//! redundant, and plain `rdtsc` is cheaper because it does not read
//! `TSC_AUX`.
//!
//! The non-x86 counters are read behind a single ordering barrier for both
//! start and stop; those ISAs' counter reads do not reorder the way
//! `rdtsc` does.

use std::sync::OnceLock;

use crate::config::Params;
use crate::statistics::mode;
use crate::types::Ticks;

/// Reads the timer immediately before a region to measure.
///
/// Returns an absolute timestamp in ticks; subtract a [`start`] value from
/// a [`stop`] value (wrapping) to get the region's elapsed ticks plus a
/// platform-constant overhead quantified by [`timer_resolution`].
#[inline]
pub fn start() -> Ticks {
    #[cfg(target_arch = "x86_64")]
    {
        start_x86_64()
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        read_counter()
    }
}

/// Reads the timer immediately after a region to measure.
#[inline]
pub fn stop() -> Ticks {
    #[cfg(target_arch = "x86_64")]
    {
        stop_x86_64()
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        read_counter()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn start_x86_64() -> Ticks {
    let t: u64;
    unsafe {
        // rdx holds TSC >> 32; the implicit memory clobber stops the
        // compiler from moving loads/stores across the read.
        std::arch::asm!(
            "lfence",
            "rdtsc",
            "shl rdx, 32",
            "or rax, rdx",
            "lfence",
            out("rax") t,
            out("rdx") _,
            options(nostack),
        );
    }
    t
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn stop_x86_64() -> Ticks {
    let t: u64;
    unsafe {
        // rcx receives TSC_AUX, which we discard.
        std::arch::asm!(
            "rdtscp",
            "shl rdx, 32",
            "or rax, rdx",
            "lfence",
            out("rax") t,
            out("rcx") _,
            out("rdx") _,
            options(nostack),
        );
    }
    t
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn read_counter() -> Ticks {
    let t: u64;
    unsafe {
        // isb drains the pipeline so the counter read cannot drift across
        // the region boundary.
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            out(reg) t,
            options(nostack),
        );
    }
    t
}

#[cfg(target_arch = "riscv64")]
#[inline]
fn read_counter() -> Ticks {
    let t: u64;
    unsafe {
        std::arch::asm!(
            "rdcycle {}",
            out(reg) t,
            options(nostack),
        );
    }
    t
}

#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
#[inline]
fn read_counter() -> Ticks {
    use std::time::Instant;

    // A process-wide anchor keeps readings consistent within a run.
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    let anchor = ANCHOR.get_or_init(Instant::now);
    anchor.elapsed().as_nanos() as Ticks
}

/// Conversion factor from ticks to seconds, computed once per process.
///
/// - x86_64: the nominal frequency quoted in the CPUID brand string. The
///   TSC is invariant on all recent Intel/AMD parts, so ticks advance at
///   this rate regardless of turbo or throttling of the core clock.
///   Returns 0.0 when the brand string is missing or unparseable; ticks
///   remain comparable within a run, but no seconds conversion exists.
/// - aarch64: the architectural counter frequency from `cntfrq_el0`.
/// - riscv64: calibrated against the OS monotonic clock; the cycle counter
///   frequency is not exposed to user space.
/// - Fallback: 1e9, since ticks are nanoseconds.
pub fn invariant_ticks_per_second() -> f64 {
    static TICKS_PER_SECOND: OnceLock<f64> = OnceLock::new();
    *TICKS_PER_SECOND.get_or_init(detect_ticks_per_second)
}

/// Current time in seconds; only meaningful on platforms where
/// [`invariant_ticks_per_second`] is nonzero.
pub fn now() -> f64 {
    static MUL: OnceLock<f64> = OnceLock::new();
    let mul = *MUL.get_or_init(|| 1.0 / invariant_ticks_per_second());
    start() as f64 * mul
}

/// The minimum measurable interval: the modal value of a back-to-back
/// `stop() - start()` gap. Computed once per process.
pub fn timer_resolution() -> Ticks {
    static TIMER_RESOLUTION: OnceLock<Ticks> = OnceLock::new();
    *TIMER_RESOLUTION.get_or_init(probe_resolution)
}

fn probe_resolution() -> Ticks {
    // Nested loop keeps the sample arrays within stack and L1 capacity.
    let mut repetitions = [0 as Ticks; Params::TIMER_SAMPLES];
    for repetition in repetitions.iter_mut() {
        let mut samples = [0; Params::TIMER_SAMPLES];
        for sample in samples.iter_mut() {
            let t0 = start();
            let t1 = stop();
            *sample = t1.wrapping_sub(t0);
        }
        *repetition = mode(&mut samples);
    }
    mode(&mut repetitions)
}

#[cfg(target_arch = "x86_64")]
fn detect_ticks_per_second() -> f64 {
    nominal_clock_rate()
}

#[cfg(target_arch = "aarch64")]
fn detect_ticks_per_second() -> f64 {
    let freq: u64;
    unsafe {
        std::arch::asm!(
            "mrs {}, cntfrq_el0",
            out(reg) freq,
            options(nomem, nostack, preserves_flags),
        );
    }
    freq as f64
}

#[cfg(target_arch = "riscv64")]
fn detect_ticks_per_second() -> f64 {
    calibrate_ticks_per_second()
}

#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
fn detect_ticks_per_second() -> f64 {
    1e9
}

/// Returns the frequency quoted in the CPUID brand string, e.g. the
/// `3.70GHz` in `"Intel(R) Core(TM) i7-8700K CPU @ 3.70GHz"`, or 0.0 if no
/// such suffix parses.
#[cfg(target_arch = "x86_64")]
fn nominal_clock_rate() -> f64 {
    let brand = match brand_string() {
        Some(brand) => brand,
        None => return 0.0,
    };

    // Suffixes defined by the CPUID documentation; the preceding
    // whitespace-delimited token is a decimal number.
    const SUFFIXES: [(&str, f64); 3] = [("MHz", 1e6), ("GHz", 1e9), ("THz", 1e12)];
    for (suffix, multiplier) in SUFFIXES {
        if let Some(pos) = brand.find(suffix) {
            let digits = brand[..pos]
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or_default();
            if let Ok(value) = digits.parse::<f64>() {
                return value * multiplier;
            }
        }
    }

    0.0
}

/// The 48-byte processor brand string from CPUID leaves
/// `0x80000002..=0x80000004`, or `None` if those leaves are unsupported.
#[cfg(target_arch = "x86_64")]
fn brand_string() -> Option<String> {
    use core::arch::x86_64::__cpuid;

    // Leaf 0x80000000 reports the highest supported extended leaf.
    let max_extended_leaf = unsafe { __cpuid(0x8000_0000) }.eax;
    if max_extended_leaf < 0x8000_0004 {
        return None;
    }

    let mut bytes = Vec::with_capacity(48);
    for leaf in 0x8000_0002u32..=0x8000_0004 {
        let registers = unsafe { __cpuid(leaf) };
        for register in [registers.eax, registers.ebx, registers.ecx, registers.edx] {
            bytes.extend_from_slice(&register.to_le_bytes());
        }
    }

    let brand = String::from_utf8_lossy(&bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    Some(brand)
}

/// Median of observed tick/nanosecond ratios over repeated short sleeps.
#[cfg(target_arch = "riscv64")]
fn calibrate_ticks_per_second() -> f64 {
    use std::time::{Duration, Instant};

    const ROUNDS: usize = 25;

    let mut ratios = Vec::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        let t0 = start();
        let wall = Instant::now();
        std::thread::sleep(Duration::from_millis(2));
        let t1 = stop();

        let nanos = wall.elapsed().as_nanos() as u64;
        if nanos == 0 {
            continue;
        }
        ratios.push(t1.wrapping_sub(t0) as f64 / nanos as f64 * 1e9);
    }

    if ratios.is_empty() {
        return 0.0;
    }
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = ratios.len() / 2;
    if ratios.len() % 2 == 0 {
        (ratios[mid - 1] + ratios[mid]) / 2.0
    } else {
        ratios[mid]
    }
}
