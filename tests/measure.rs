//! End-to-end measurement scenarios.
//!
//! Real timing on a shared machine can fail (the engine reports noise
//! inversions by returning 0), so the timing-sensitive tests retry a few
//! times and skip with a message rather than fail on a noisy host.

use nanotick::{measure, timer_resolution, FuncInput, FuncOutput, Measurement, Params};

fn returns_input(_arg: *const u8, input: FuncInput) -> FuncOutput {
    input
}

/// Cost grows linearly with the input value.
fn spin(_arg: *const u8, input: FuncInput) -> FuncOutput {
    let mut acc = input;
    for i in 0..input * 50 {
        acc = acc.wrapping_mul(6364136223846793005).wrapping_add(i);
    }
    acc
}

/// Runs `measure` up to `attempts` times, returning the first successful
/// result count, or `None` if every attempt hit a noise inversion.
fn measure_with_retry(
    func: nanotick::Func,
    inputs: &[FuncInput],
    results: &mut [Measurement],
    attempts: usize,
) -> Option<usize> {
    let params = Params::default();
    for _ in 0..attempts {
        let num = measure(func, std::ptr::null(), inputs, results, &params);
        if num > 0 {
            return Some(num);
        }
    }
    None
}

#[test]
fn test_empty_function_cost_near_zero() {
    let inputs = [7, 7, 7];
    let mut results = [Measurement::default(); 1];
    let Some(num) = measure_with_retry(returns_input, &inputs, &mut results, 3) else {
        eprintln!("[SKIPPED] test_empty_function_cost_near_zero: machine too noisy");
        return;
    };

    assert_eq!(num, 1);
    assert_eq!(results[0].input, 7);
    // Subtracting overhead from overhead should leave (nearly) nothing.
    let bound = timer_resolution() as f32;
    assert!(
        results[0].ticks < bound,
        "empty function measured {} ticks, bound {}",
        results[0].ticks,
        bound
    );
}

#[test]
fn test_costlier_input_measures_costlier() {
    let inputs = [1, 8];
    let mut results = [Measurement::default(); 2];
    let Some(num) = measure_with_retry(spin, &inputs, &mut results, 3) else {
        eprintln!("[SKIPPED] test_costlier_input_measures_costlier: machine too noisy");
        return;
    };

    assert_eq!(num, 2);
    // Results come back in ascending input order.
    assert_eq!(results[0].input, 1);
    assert_eq!(results[1].input, 8);
    assert!(
        results[1].ticks > results[0].ticks,
        "8x the work measured {} <= {} ticks",
        results[1].ticks,
        results[0].ticks
    );
    for result in &results {
        assert!(result.variability >= 0.0);
    }
}

#[test]
fn test_duplicate_inputs_collapse_to_unique() {
    let inputs = [3, 1, 2, 1, 3, 3];
    let mut results = [Measurement::default(); 3];
    let Some(num) = measure_with_retry(spin, &inputs, &mut results, 3) else {
        eprintln!("[SKIPPED] test_duplicate_inputs_collapse_to_unique: machine too noisy");
        return;
    };
    assert_eq!(num, 3);
    assert_eq!(results[0].input, 1);
    assert_eq!(results[1].input, 2);
    assert_eq!(results[2].input, 3);
}

// Debug builds assert on the empty-input precondition; release builds
// report failure by returning zero results.
#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "no inputs to measure"))]
fn test_empty_inputs_rejected() {
    let mut results = [Measurement::default(); 1];
    let num = measure(
        returns_input,
        std::ptr::null(),
        &[],
        &mut results,
        &Params::default(),
    );
    assert_eq!(num, 0, "empty inputs must yield zero results");
}

#[test]
fn test_measurement_serializes() {
    let measurement = Measurement {
        input: 42,
        ticks: 17.5,
        variability: 0.013,
    };
    let json = serde_json::to_string(&measurement).expect("serialize");
    assert!(json.contains("\"input\":42"));

    let back: Measurement = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, measurement);
}
