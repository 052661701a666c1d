//! # Raster Statistics
//!
//! Pure statistical summaries over already-decoded raster samples.
//! Decoding, windowing, and reprojection belong to external raster
//! tooling; this module only aggregates `f64` slices that tooling hands
//! over.
//!
//! NaN samples and samples equal to the band's nodata sentinel are
//! masked out before aggregation. The standard deviation is the
//! population form (divide by N, not N-1), matching the statistics block
//! served by the metadata endpoint.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Statistical summary of one raster band sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSummary {
    /// Total samples inspected, masked or not.
    pub count: usize,
    /// Samples that contributed to the statistics.
    pub valid_count: usize,
    /// Samples masked out as NaN or nodata.
    pub masked_count: usize,
    /// Minimum valid sample.
    pub min: f64,
    /// Maximum valid sample.
    pub max: f64,
    /// Arithmetic mean of valid samples.
    pub mean: f64,
    /// Population standard deviation of valid samples.
    pub std_dev: f64,
}

/// Summarize a slice of decoded samples, masking NaN and `nodata`.
///
/// # Errors
///
/// Returns `CoreError::EmptyRaster` when the slice is empty or every
/// sample is masked — a summary full of NaN placeholders would only
/// push the problem downstream.
pub fn summarize(samples: &[f64], nodata: Option<f64>) -> Result<RasterSummary, CoreError> {
    let mut valid_count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for &s in samples {
        if is_masked(s, nodata) {
            continue;
        }
        valid_count += 1;
        min = min.min(s);
        max = max.max(s);
        sum += s;
    }

    if valid_count == 0 {
        return Err(CoreError::EmptyRaster);
    }

    let mean = sum / valid_count as f64;
    let mut sq_dev = 0.0;
    for &s in samples {
        if is_masked(s, nodata) {
            continue;
        }
        sq_dev += (s - mean) * (s - mean);
    }
    let std_dev = (sq_dev / valid_count as f64).sqrt();

    Ok(RasterSummary {
        count: samples.len(),
        valid_count,
        masked_count: samples.len() - valid_count,
        min,
        max,
        mean,
        std_dev,
    })
}

/// True when the sample must not contribute to the statistics.
fn is_masked(sample: f64, nodata: Option<f64>) -> bool {
    sample.is_nan() || nodata.is_some_and(|nd| sample == nd)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Statistics are internally consistent for any finite sample.
        #[test]
        fn summary_is_consistent(samples in prop::collection::vec(-1.0e9f64..1.0e9, 1..200)) {
            let s = summarize(&samples, None).unwrap();
            prop_assert_eq!(s.count, samples.len());
            prop_assert_eq!(s.valid_count, samples.len());
            prop_assert!(s.min <= s.mean + 1e-9);
            prop_assert!(s.mean <= s.max + 1e-9);
            prop_assert!(s.std_dev >= 0.0);
        }

        /// Masking the nodata sentinel never changes the other samples'
        /// contribution.
        #[test]
        fn nodata_masking_matches_filtering(
            samples in prop::collection::vec(-1.0e6f64..1.0e6, 1..100),
            nodata in -1.0e6f64..1.0e6,
        ) {
            let mut padded = samples.clone();
            padded.push(nodata);
            let kept: Vec<f64> = samples.iter().copied().filter(|s| *s != nodata).collect();
            prop_assume!(!kept.is_empty());

            let masked = summarize(&padded, Some(nodata)).unwrap();
            let filtered = summarize(&kept, None).unwrap();
            prop_assert_eq!(masked.valid_count, filtered.valid_count);
            prop_assert!((masked.mean - filtered.mean).abs() < 1e-6);
        }
    }
}
