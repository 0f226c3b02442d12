//! Weighted histogram accumulation with propagated statistical errors.
//!
//! Two kinds: [`IntHistogram`] keys entries by the exact integer value of
//! one jet column, [`BinHistogram`] by membership in an ordered sequence
//! of bin intervals. Both track a summed weight and summed squared weight
//! per bin plus running totals, and are finalized in place by `finish`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::Jet;

/// Histogram keyed by the exact integer value of one jet column.
///
/// `add` rejects any value with a nonzero fractional part. `finish`
/// normalizes each key's summed weight by the total (a probability mass
/// function) and replaces each key's summed squared weight with
/// `sqrt(sum) / total_weight` (a weighted standard error).
#[derive(Debug, Clone, Serialize)]
pub struct IntHistogram {
    /// Name of the histogrammed variable.
    pub var_name: String,
    /// Column index of the histogrammed variable.
    pub var_index: usize,
    /// Total summed weight across all keys.
    pub total_weight: f64,
    /// Total summed squared weight across all keys. Deliberately left as
    /// a raw sum of squares by `finish`; only per-key errors are rooted.
    pub total_err: f64,
    /// Per-key summed weight (mass after `finish`).
    pub bin_sums: BTreeMap<i64, f64>,
    /// Per-key summed squared weight (standard error after `finish`).
    pub bin_errs: BTreeMap<i64, f64>,
}

impl IntHistogram {
    /// Create an empty integer-keyed histogram over the given column.
    pub fn new(var_name: &str, var_index: usize) -> Self {
        Self {
            var_name: var_name.to_string(),
            var_index,
            total_weight: 0.0,
            total_err: 0.0,
            bin_sums: BTreeMap::new(),
            bin_errs: BTreeMap::new(),
        }
    }

    /// Accumulate one weighted observation from `jet`.
    pub fn add(&mut self, weight: f64, jet: &Jet) -> Result<()> {
        let val = jet[self.var_index];
        if val.fract() != 0.0 {
            return Err(Error::NonIntegerBin(val));
        }
        let key = val as i64;
        *self.bin_sums.entry(key).or_insert(0.0) += weight;
        *self.bin_errs.entry(key).or_insert(0.0) += weight * weight;
        self.total_weight += weight;
        self.total_err += weight * weight;
        Ok(())
    }

    /// Normalize to a probability mass function with per-key errors.
    pub fn finish(&mut self) {
        for v in self.bin_sums.values_mut() {
            *v /= self.total_weight;
        }
        for v in self.bin_errs.values_mut() {
            *v = v.sqrt() / self.total_weight;
        }
    }
}

/// Histogram over an ordered, strictly increasing sequence of bin
/// endpoints.
///
/// Bins are half-open `[lo, hi)` except the last, which also includes its
/// upper endpoint. Values below the first endpoint or above the last are
/// dropped entirely (neither binned nor counted in the totals). `finish`
/// normalizes each bin to a probability density (`sum / (width *
/// total_weight)`) with error `sqrt(sum_sq) / (width * total_weight)`.
#[derive(Debug, Clone, Serialize)]
pub struct BinHistogram {
    /// Name of the histogrammed variable.
    pub var_name: String,
    /// Column index of the histogrammed variable.
    pub var_index: usize,
    /// Total summed weight across all in-range bins.
    pub total_weight: f64,
    /// Total summed squared weight across all in-range bins. Deliberately
    /// left as a raw sum of squares by `finish`; only per-bin errors are
    /// rooted.
    pub total_err: f64,
    /// Bin endpoints (length = number of bins + 1), strictly increasing.
    pub bin_endpoints: Vec<f64>,
    /// Per-bin summed weight (density after `finish`).
    pub bin_sums: Vec<f64>,
    /// Per-bin summed squared weight (standard error after `finish`).
    pub bin_errs: Vec<f64>,
}

impl BinHistogram {
    /// Create a histogram with explicit bin endpoints.
    ///
    /// Requires at least two endpoints, strictly increasing.
    pub fn with_endpoints(
        var_name: &str,
        var_index: usize,
        bin_endpoints: Vec<f64>,
    ) -> Result<Self> {
        if bin_endpoints.len() < 2 {
            return Err(Error::InvalidBinning("histogram must have at least 1 bin".into()));
        }
        if !bin_endpoints.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::InvalidBinning(
                "bin endpoints must be strictly increasing".into(),
            ));
        }
        let n_bins = bin_endpoints.len() - 1;
        Ok(Self {
            var_name: var_name.to_string(),
            var_index,
            total_weight: 0.0,
            total_err: 0.0,
            bin_endpoints,
            bin_sums: vec![0.0; n_bins],
            bin_errs: vec![0.0; n_bins],
        })
    }

    /// Create a histogram with `n_bins` uniform bins over `[min, max]`.
    pub fn uniform(
        var_name: &str,
        var_index: usize,
        min: f64,
        max: f64,
        n_bins: usize,
    ) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::InvalidBinning("histogram must have at least 1 bin".into()));
        }
        let endpoints = (0..=n_bins)
            .map(|i| min + (max - min) * i as f64 / n_bins as f64)
            .collect();
        Self::with_endpoints(var_name, var_index, endpoints)
    }

    /// Accumulate one weighted observation from `jet`.
    ///
    /// Out-of-range values are dropped without touching any accumulator.
    pub fn add(&mut self, weight: f64, jet: &Jet) {
        let val = jet[self.var_index];
        // Index of the first endpoint strictly greater than the value.
        let idx = self.bin_endpoints.partition_point(|&e| e <= val);
        if idx == 0 {
            // below the first endpoint
        } else if idx <= self.bin_sums.len() {
            self.fill(idx - 1, weight);
        } else if val == self.bin_endpoints[self.bin_endpoints.len() - 1] {
            // the last endpoint belongs to the final bin
            self.fill(self.bin_sums.len() - 1, weight);
        } else {
            // above the last endpoint
        }
    }

    fn fill(&mut self, bin: usize, weight: f64) {
        self.bin_sums[bin] += weight;
        self.bin_errs[bin] += weight * weight;
        self.total_weight += weight;
        self.total_err += weight * weight;
    }

    /// Normalize to a probability density with per-bin errors.
    pub fn finish(&mut self) {
        for i in 0..self.bin_sums.len() {
            let width = self.bin_endpoints[i + 1] - self.bin_endpoints[i];
            self.bin_sums[i] /= width * self.total_weight;
            self.bin_errs[i] = self.bin_errs[i].sqrt() / (width * self.total_weight);
        }
    }
}

/// A histogram of either kind, dispatched per cut.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Histogram {
    /// Integer-keyed accumulation.
    Ints(IntHistogram),
    /// Interval-binned accumulation.
    Bins(BinHistogram),
}

impl Histogram {
    /// Name of the histogrammed variable.
    pub fn var_name(&self) -> &str {
        match self {
            Histogram::Ints(h) => &h.var_name,
            Histogram::Bins(h) => &h.var_name,
        }
    }

    /// Accumulate one weighted observation from `jet`.
    pub fn add(&mut self, weight: f64, jet: &Jet) -> Result<()> {
        match self {
            Histogram::Ints(h) => h.add(weight, jet),
            Histogram::Bins(h) => {
                h.add(weight, jet);
                Ok(())
            }
        }
    }

    /// Finalize into a normalized density or mass function.
    pub fn finish(&mut self) {
        match self {
            Histogram::Ints(h) => h.finish(),
            Histogram::Bins(h) => h.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn int_histogram_accumulates_by_key() {
        let mut h = IntHistogram::new("v", 1);
        h.add(0.5, &vec![0.0, 1.0, 2.0]).unwrap();
        h.add(0.1, &vec![0.0, 1.0, 1.0]).unwrap();
        h.add(2.0, &vec![6.0, 4.0, 6.0]).unwrap();

        assert_relative_eq!(h.bin_sums[&1], 0.5 + 0.1);
        assert_relative_eq!(h.bin_sums[&4], 2.0);
        assert_relative_eq!(h.total_weight, 2.6);
    }

    #[test]
    fn int_histogram_rejects_fractional_values() {
        let mut h = IntHistogram::new("v", 0);
        let err = h.add(1.0, &vec![2.5]).unwrap_err();
        assert!(matches!(err, Error::NonIntegerBin(v) if v == 2.5));
        // negative integers are fine
        h.add(1.0, &vec![-3.0]).unwrap();
        assert_relative_eq!(h.bin_sums[&-3], 1.0);
    }

    #[test]
    fn int_histogram_masses_sum_to_one() {
        let mut h = IntHistogram::new("v", 0);
        h.add(0.5, &vec![1.0]).unwrap();
        h.add(0.1, &vec![1.0]).unwrap();
        h.add(2.0, &vec![4.0]).unwrap();
        h.finish();

        let mass: f64 = h.bin_sums.values().sum();
        assert_relative_eq!(mass, 1.0, epsilon = 1e-12);
        // per-key error is rooted, the total stays a raw sum of squares
        assert_relative_eq!(h.bin_errs[&1], (0.5f64 * 0.5 + 0.1 * 0.1).sqrt() / 2.6);
        assert_relative_eq!(h.total_err, 0.25 + 0.01 + 4.0);
    }

    #[test]
    fn uniform_endpoints() {
        let h = BinHistogram::uniform("v", 1, 2.0, 7.0, 5).unwrap();
        assert_eq!(h.bin_endpoints, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(h.bin_sums.len(), 5);
    }

    #[test]
    fn bin_histogram_bin_placement() {
        let mut h = BinHistogram::uniform("v", 1, 2.0, 7.0, 5).unwrap();

        // before the first endpoint: dropped
        h.add(1.0, &vec![0.0, 1.9999]);
        // [2, 3)
        h.add(0.1, &vec![0.0, 2.0]);
        h.add(0.2, &vec![0.0, 2.9999]);
        // [3, 4)
        h.add(0.3, &vec![0.0, 3.0]);
        // [6, 7]: last endpoint is inclusive
        h.add(0.9, &vec![0.0, 6.0]);
        h.add(1.0, &vec![0.0, 7.0]);
        // beyond the last endpoint: dropped
        h.add(1.1, &vec![0.0, 7.0001]);

        assert_relative_eq!(h.bin_sums[0], 0.1 + 0.2);
        assert_relative_eq!(h.bin_sums[1], 0.3);
        assert_relative_eq!(h.bin_sums[4], 0.9 + 1.0);
        // dropped values never reach the totals
        assert_relative_eq!(h.total_weight, 0.1 + 0.2 + 0.3 + 0.9 + 1.0);
    }

    #[test]
    fn bin_histogram_finish_produces_density() {
        let mut h = BinHistogram::uniform("v", 0, 2.0, 7.0, 5).unwrap();
        h.add(0.1, &vec![2.1]);
        h.add(0.2, &vec![2.2]);
        h.finish();

        // bin width 1, total weight 0.3
        assert_relative_eq!(h.bin_sums[0], (0.1 + 0.2) / 1.0 / 0.3, epsilon = 1e-12);
        assert_relative_eq!(
            h.bin_errs[0],
            (0.1f64 * 0.1 + 0.2 * 0.2).sqrt() / 1.0 / 0.3,
            epsilon = 1e-12
        );
    }

    #[test]
    fn bin_histogram_density_integrates_to_one() {
        let mut h = BinHistogram::with_endpoints("v", 0, vec![0.0, 0.5, 2.0, 3.0]).unwrap();
        h.add(0.4, &vec![0.1]);
        h.add(0.7, &vec![1.0]);
        h.add(1.3, &vec![2.5]);
        h.add(9.0, &vec![-1.0]); // dropped, must not distort the integral
        h.finish();

        let integral: f64 = (0..h.bin_sums.len())
            .map(|i| h.bin_sums[i] * (h.bin_endpoints[i + 1] - h.bin_endpoints[i]))
            .sum();
        assert_relative_eq!(integral, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_values_are_dropped() {
        let mut h = BinHistogram::uniform("v", 0, 0.0, 1.0, 2).unwrap();
        h.add(1.0, &vec![f64::NAN]);
        assert_relative_eq!(h.total_weight, 0.0);
    }

    #[test]
    fn construction_errors() {
        assert!(BinHistogram::with_endpoints("v", 0, vec![1.0]).is_err());
        assert!(BinHistogram::with_endpoints("v", 0, vec![1.0, 1.0]).is_err());
        assert!(BinHistogram::with_endpoints("v", 0, vec![1.0, 3.0, 2.0]).is_err());
        assert!(BinHistogram::uniform("v", 0, 0.0, 1.0, 0).is_err());
        assert!(BinHistogram::uniform("v", 0, 1.0, 0.0, 2).is_err());
    }

    #[test]
    fn histogram_enum_dispatch() {
        let mut h = Histogram::Ints(IntHistogram::new("v", 0));
        h.add(1.0, &vec![3.0]).unwrap();
        h.finish();
        assert_eq!(h.var_name(), "v");
        match h {
            Histogram::Ints(h) => assert_relative_eq!(h.bin_sums[&3], 1.0),
            Histogram::Bins(_) => unreachable!(),
        }
    }
}
