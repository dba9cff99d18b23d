//! Descriptive statistics over readings and batch averages

use serde::{Deserialize, Serialize};

/// Arithmetic mean. Empty input yields NaN, like a plain sum / count.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let variance = values
        .iter()
        .map(|&value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    variance.sqrt()
}

/// Summary of a sequence of batch averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize a sequence. An empty sequence gives zeroes.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { count: 0, mean: 0.0, std_dev: 0.0, min: 0.0, max: 0.0 };
        }

        let mean = mean(values);
        Self {
            count: values.len(),
            mean,
            std_dev: std_dev(values, mean),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
