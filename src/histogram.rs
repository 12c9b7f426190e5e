use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::dataset::ReferenceData;

pub const DEFAULT_BINS: usize = 20;

/// How bar heights are expressed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum BinScale {
    /// raw number of participants per bin
    #[default]
    Count,
    /// share of the group per bin; each group sums to 1
    Density,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub diagnosed: f64,
    pub control: f64,
}

/// Typing-speed distribution split by diagnosis, on shared bin edges
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    pub scale: BinScale,
}

impl Histogram {
    pub fn build(data: &ReferenceData, bins: usize, scale: BinScale) -> Option<Self> {
        let (diagnosed, control) = data.split_by_diagnosis();
        let (lo, hi) = match diagnosed.iter().chain(control.iter()).minmax() {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(&v) => (v, v),
            MinMaxResult::MinMax(&lo, &hi) => (lo, hi),
        };
        let bins = bins.max(1);
        // a single distinct value still gets one unit-wide bin
        let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };

        let mut out: Vec<Bin> = (0..bins)
            .map(|i| Bin {
                lo: lo + i as f64 * width,
                hi: lo + (i + 1) as f64 * width,
                diagnosed: 0.0,
                control: 0.0,
            })
            .collect();

        let index = |v: f64| (((v - lo) / width).floor() as usize).min(bins - 1);
        for &v in &diagnosed {
            out[index(v)].diagnosed += 1.0;
        }
        for &v in &control {
            out[index(v)].control += 1.0;
        }

        if scale == BinScale::Density {
            let (nd, nc) = (diagnosed.len() as f64, control.len() as f64);
            for bin in &mut out {
                if nd > 0.0 {
                    bin.diagnosed /= nd;
                }
                if nc > 0.0 {
                    bin.control /= nc;
                }
            }
        }

        Some(Self { bins: out, scale })
    }

    /// Bin holding `value`, clamped to the outer bins
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        let first = self.bins.first()?;
        let last_idx = self.bins.len() - 1;
        if value < first.lo {
            return Some(0);
        }
        Some(
            self.bins
                .iter()
                .position(|b| value < b.hi)
                .unwrap_or(last_idx),
        )
    }

    pub fn max_height(&self) -> f64 {
        self.bins
            .iter()
            .map(|b| b.diagnosed.max(b.control))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReferenceRecord;

    fn data(points: &[(f64, bool)]) -> ReferenceData {
        ReferenceData::from_records(
            points
                .iter()
                .map(|&(typing_speed, diagnosed)| ReferenceRecord {
                    typing_speed,
                    diagnosed,
                    updrs: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_data_has_no_histogram() {
        assert_eq!(Histogram::build(&ReferenceData::default(), 20, BinScale::Count), None);
    }

    #[test]
    fn test_counts_sum_to_group_sizes() {
        let d = data(&[(10.0, true), (20.0, true), (35.0, false), (50.0, false), (50.0, true)]);

        let h = Histogram::build(&d, 4, BinScale::Count).unwrap();

        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.bins.iter().map(|b| b.diagnosed).sum::<f64>(), 3.0);
        assert_eq!(h.bins.iter().map(|b| b.control).sum::<f64>(), 2.0);
        // max value lands in the last bin
        assert_eq!(h.bins[3].diagnosed, 1.0);
        assert_eq!(h.bins[3].control, 1.0);
        assert_eq!(h.bins[0].lo, 10.0);
        assert_eq!(h.bins[3].hi, 50.0);
    }

    #[test]
    fn test_density_sums_to_one_per_group() {
        let d = data(&[(10.0, true), (20.0, true), (35.0, false), (50.0, false), (12.0, false)]);

        let h = Histogram::build(&d, DEFAULT_BINS, BinScale::Density).unwrap();

        let sum_d: f64 = h.bins.iter().map(|b| b.diagnosed).sum();
        let sum_c: f64 = h.bins.iter().map(|b| b.control).sum();
        assert!((sum_d - 1.0).abs() < 1e-9);
        assert!((sum_c - 1.0).abs() < 1e-9);
        assert_eq!(h.scale, BinScale::Density);
    }

    #[test]
    fn test_density_with_one_empty_group() {
        let d = data(&[(10.0, true), (20.0, true)]);
        let h = Histogram::build(&d, 2, BinScale::Density).unwrap();

        assert_eq!(h.bins.iter().map(|b| b.control).sum::<f64>(), 0.0);
        assert_eq!(h.max_height(), 0.5);
    }

    #[test]
    fn test_single_value() {
        let d = data(&[(42.0, false)]);
        let h = Histogram::build(&d, 3, BinScale::Count).unwrap();

        assert_eq!(h.bins[0].control, 1.0);
        assert_eq!(h.bin_of(42.0), Some(0));
    }

    #[test]
    fn test_bin_of_clamps() {
        let d = data(&[(10.0, true), (50.0, false)]);
        let h = Histogram::build(&d, 4, BinScale::Count).unwrap();

        assert_eq!(h.bin_of(0.0), Some(0));
        assert_eq!(h.bin_of(10.0), Some(0));
        assert_eq!(h.bin_of(25.0), Some(1));
        assert_eq!(h.bin_of(49.0), Some(3));
        assert_eq!(h.bin_of(500.0), Some(3));
    }

    #[test]
    fn test_scale_display() {
        assert_eq!(BinScale::Density.to_string(), "Density");
    }
}
