//! Minimal 1D histograms and profiles, with storage that can be merged across
//! independently filled copies (one per batch of events)

use crate::numeric::Float;
use nalgebra::DVector;
use prefix_num_ops::real::*;

/// Binning of a histogram axis
#[derive(Clone, Debug, PartialEq)]
pub enum Axis {
    /// Equal-width bins over [min, max)
    Uniform { bins: usize, min: Float, max: Float },

    /// Arbitrary bins, given by their increasing edges
    Variable(Vec<Float>),
}
//
impl Axis {
    /// Set up a uniform axis
    pub fn uniform(bins: usize, min: Float, max: Float) -> Self {
        assert!(bins > 0 && max > min, "Invalid uniform axis");
        Axis::Uniform { bins, min, max }
    }

    /// Set up an axis with variable bin widths
    pub fn variable(edges: &[Float]) -> Self {
        assert!(edges.len() >= 2, "An axis needs at least one bin");
        assert!(
            edges.windows(2).all(|w| w[0] < w[1]),
            "Bin edges must be strictly increasing"
        );
        Axis::Variable(edges.to_vec())
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        match self {
            Axis::Uniform { bins, .. } => *bins,
            Axis::Variable(edges) => edges.len() - 1,
        }
    }

    /// Bin containing x, if any (bins are half-open [lo, hi))
    pub fn find_bin(&self, x: Float) -> Option<usize> {
        match self {
            Axis::Uniform { bins, min, max } => {
                if x < *min || x >= *max || x.is_nan() {
                    return None;
                }
                let bin = ((x - min) / (max - min) * (*bins as Float)) as usize;
                // Rounding can push values right below max into a nonexistent bin
                Some(bin.min(bins - 1))
            }
            Axis::Variable(edges) => {
                if x < edges[0] || x >= edges[edges.len() - 1] || x.is_nan() {
                    return None;
                }
                Some(edges.partition_point(|&edge| edge <= x) - 1)
            }
        }
    }

    /// Center of a bin
    pub fn bin_center(&self, bin: usize) -> Float {
        match self {
            Axis::Uniform { bins, min, max } => {
                min + (bin as Float + 0.5) * (max - min) / (*bins as Float)
            }
            Axis::Variable(edges) => (edges[bin] + edges[bin + 1]) / 2.,
        }
    }
}

/// Histogram of a single variable
#[derive(Clone, Debug, PartialEq)]
pub struct Histo1D {
    /// Binning
    axis: Axis,

    /// Per-bin counts
    counts: DVector<Float>,

    /// Number of fills below the axis range
    underflow: usize,

    /// Number of fills above the axis range
    overflow: usize,

    /// Sum of in-range values, for the mean
    sum_x: Float,

    /// Sum of squared in-range values, for the RMS
    sum_x2: Float,
}
//
impl Histo1D {
    /// Book an empty histogram
    pub fn new(axis: Axis) -> Self {
        let counts = DVector::zeros(axis.num_bins());
        Self {
            axis,
            counts,
            underflow: 0,
            overflow: 0,
            sum_x: 0.,
            sum_x2: 0.,
        }
    }

    /// Record one value
    pub fn fill(&mut self, x: Float) {
        match self.axis.find_bin(x) {
            Some(bin) => {
                self.counts[bin] += 1.;
                self.sum_x += x;
                self.sum_x2 += x * x;
            }
            None if x.is_nan() => {}
            None => {
                if self.below_range(x) {
                    self.underflow += 1;
                } else {
                    self.overflow += 1;
                }
            }
        }
    }

    /// Truth that x lies below the first bin
    fn below_range(&self, x: Float) -> bool {
        match &self.axis {
            Axis::Uniform { min, .. } => x < *min,
            Axis::Variable(edges) => x < edges[0],
        }
    }

    /// Number of in-range entries
    pub fn entries(&self) -> usize {
        self.counts.sum() as usize
    }

    /// Number of entries, including those outside of the axis range
    pub fn all_entries(&self) -> usize {
        self.entries() + self.underflow + self.overflow
    }

    /// Number of entries outside of the axis range (underflow, overflow)
    pub fn out_of_range(&self) -> (usize, usize) {
        (self.underflow, self.overflow)
    }

    /// Mean of the in-range entries, if any
    pub fn mean(&self) -> Option<Float> {
        let n = self.counts.sum();
        (n > 0.).then(|| self.sum_x / n)
    }

    /// Standard deviation of the in-range entries, if any
    pub fn rms(&self) -> Option<Float> {
        let n = self.counts.sum();
        let mean = self.mean()?;
        Some(sqrt(abs(self.sum_x2 / n - mean * mean)))
    }

    /// Add the contents of another histogram with identical binning
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(self.axis, other.axis, "Cannot merge histograms with different binning");
        self.counts += &other.counts;
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.sum_x += other.sum_x;
        self.sum_x2 += other.sum_x2;
    }
}

/// Profile: mean of a y variable as a function of binned x
///
/// Like a profile booked with y limits, entries whose y falls outside of
/// [y_min, y_max] are not recorded.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Profile1D {
    /// Binning of the x variable
    axis: Axis,

    /// Accepted y range (inclusive)
    y_range: (Float, Float),

    /// Number of entries per bin
    entries: DVector<Float>,

    /// Sum of y per bin
    sum_y: DVector<Float>,

    /// Sum of y² per bin
    sum_y2: DVector<Float>,
}
//
impl Profile1D {
    /// Book an empty profile
    pub fn new(axis: Axis, y_min: Float, y_max: Float) -> Self {
        let n = axis.num_bins();
        Self {
            axis,
            y_range: (y_min, y_max),
            entries: DVector::zeros(n),
            sum_y: DVector::zeros(n),
            sum_y2: DVector::zeros(n),
        }
    }

    /// Record one (x, y) pair
    pub fn fill(&mut self, x: Float, y: Float) {
        let (y_min, y_max) = self.y_range;
        if !(y_min..=y_max).contains(&y) {
            return;
        }
        if let Some(bin) = self.axis.find_bin(x) {
            self.entries[bin] += 1.;
            self.sum_y[bin] += y;
            self.sum_y2[bin] += y * y;
        }
    }

    /// Binning of the x variable
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Total number of recorded entries
    pub fn total_entries(&self) -> usize {
        self.entries.sum() as usize
    }

    /// Number of entries in one bin
    pub fn bin_entries(&self, bin: usize) -> usize {
        self.entries[bin] as usize
    }

    /// Mean y in one bin, if it has entries
    pub fn bin_mean(&self, bin: usize) -> Option<Float> {
        let n = self.entries[bin];
        (n > 0.).then(|| self.sum_y[bin] / n)
    }

    /// Spread of y in one bin, if it has entries
    pub fn bin_rms(&self, bin: usize) -> Option<Float> {
        let mean = self.bin_mean(bin)?;
        Some(sqrt(abs(self.sum_y2[bin] / self.entries[bin] - mean * mean)))
    }

    /// Add the contents of another profile with identical binning
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(self.axis, other.axis, "Cannot merge profiles with different binning");
        assert_eq!(self.y_range, other.y_range);
        self.entries += &other.entries;
        self.sum_y += &other.sum_y;
        self.sum_y2 += &other.sum_y2;
    }
}
