//! Fixed-width binned histograms with a console rendering

use serde::{Deserialize, Serialize};
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

/// Equal-width histogram over a slice of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Build a histogram with `bins` equal-width buckets.
    ///
    /// Returns None for an empty value slice or zero bins, so callers can
    /// omit the view instead of rendering an empty dataset.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Degenerate distribution: everything lands in a single bucket
        if max <= min {
            return Some(Self {
                min,
                max,
                bin_width: 0.0,
                counts: vec![values.len()],
            });
        }

        let bin_width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Self {
            min,
            max,
            bin_width,
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Render as rows of `lo..hi | bar count`
    pub fn render(&self) -> String {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();

        for (i, &count) in self.counts.iter().enumerate() {
            let lo = self.min + self.bin_width * i as f64;
            let hi = if i == self.counts.len() - 1 {
                self.max
            } else {
                lo + self.bin_width
            };
            let bar = "#".repeat(count * BAR_WIDTH / peak);
            writeln!(out, "{:>14.1} ..{:>14.1} | {:<40} {}", lo, hi, bar, count).unwrap();
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_values_give_no_histogram() {
        assert!(Histogram::from_values(&[], 10).is_none());
        assert!(Histogram::from_values(&[1.0], 0).is_none());
    }

    #[test]
    fn test_counts_sum_to_input_len() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let hist = Histogram::from_values(&values, 10).unwrap();

        assert_eq!(hist.total(), 100);
        assert_eq!(hist.counts.len(), 10);
        assert_eq!(hist.counts, vec![10; 10]);
        assert_relative_eq!(hist.bin_width, 9.9);
    }

    #[test]
    fn test_max_value_lands_in_last_bin() {
        let hist = Histogram::from_values(&[0.0, 5.0, 10.0], 5).unwrap();
        assert_eq!(*hist.counts.last().unwrap(), 1);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_degenerate_distribution_single_bucket() {
        let hist = Histogram::from_values(&[7.0, 7.0, 7.0], 10).unwrap();
        assert_eq!(hist.counts, vec![3]);
        assert_eq!(hist.bin_width, 0.0);
    }

    #[test]
    fn test_render_has_one_row_per_bin() {
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let hist = Histogram::from_values(&values, 5).unwrap();
        assert_eq!(hist.render().lines().count(), 5);
    }
}
