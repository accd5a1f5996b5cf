//! Collection pipeline demos.

use crate::console::Console;
use klotho_iter::stream;

/// The fixed sequence fed to the pipeline demos.
pub const DEMO_SEQUENCE: [i32; 10] = [1, 2, 3, 4, 5, 6, 6, 6, 7, 6];

/// The list summed by the functional pipeline demo.
pub const SUM_SEQUENCE: [i32; 5] = [1, 2, 3, 4, 5];

/// Appends `" Function"` to its input.
#[must_use]
pub fn function_suffix(input: &str) -> String {
    format!("{input} Function")
}

/// Keep the sixes, double them, sort and add them up.
///
/// `None` when nothing survives the filter.
#[must_use]
pub fn sum_of_doubled_sixes(values: &[i32]) -> Option<i32> {
    stream(values.iter().copied())
        .filter(|&i| i == 6)
        .map(|i| i * 2)
        .sorted()
        .reduce(|a, b| a + b)
}

/// Double every value, sort and drop repeats.
#[must_use]
pub fn doubled_distinct(values: &[i32]) -> Vec<i32> {
    stream(values.iter().copied())
        .map(|i| i * 2)
        .sorted()
        .distinct()
        .collect()
}

/// A function value mapping a list to the sum of its elements, if any.
pub fn summing_function() -> impl Fn(&[i32]) -> Option<i32> {
    |values: &[i32]| stream(values.iter().copied()).reduce(|a, b| a + b)
}

/// Print the suffix function's output and the two pipelines over
/// [`DEMO_SEQUENCE`].
pub fn run_streams(console: &Console) -> StreamsReport {
    let suffixed = function_suffix("Help Me");
    console.println(&suffixed);

    let sum = sum_of_doubled_sixes(&DEMO_SEQUENCE);
    if let Some(total) = sum {
        console.println(total);
    }

    let distinct = doubled_distinct(&DEMO_SEQUENCE);
    for value in &distinct {
        console.println(value);
    }

    tracing::debug!(?sum, distinct = distinct.len(), "pipeline demos finished");
    StreamsReport {
        suffixed,
        sum,
        distinct,
    }
}

/// Print the sum of [`SUM_SEQUENCE`] computed through [`summing_function`].
pub fn run_functional_streams(console: &Console) -> Option<i32> {
    let sum = summing_function()(&SUM_SEQUENCE);
    if let Some(total) = sum {
        console.println(total);
    }
    sum
}

/// What [`run_streams`] printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamsReport {
    /// Output of the suffix function
    pub suffixed: String,
    /// The doubled-sixes sum
    pub sum: Option<i32>,
    /// The doubled, sorted, distinct values
    pub distinct: Vec<i32>,
}
