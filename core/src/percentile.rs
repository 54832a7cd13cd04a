//! Percentile band on `SUM sales`.
//!
//! Cutoffs use linear interpolation between order statistics: for a
//! sorted column `a` of length n, percentile p sits at rank
//! `p / 100 * (n - 1)` and is interpolated between its neighbours.

use crate::{filter::FilterResult, record::AgRow};
use serde::Serialize;

/// Value at percentile `pct` (0–100) of `values`. `None` when empty.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// The open interval of sales values that survive the percentile cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesBand {
    pub bottom_threshold: f64,
    pub top_threshold: f64,
}

impl SalesBand {
    /// Cutoffs excluding the top `top_pct` and bottom `bottom_pct` percent.
    pub fn compute(sales: &[f64], top_pct: f64, bottom_pct: f64) -> Option<Self> {
        Some(Self {
            top_threshold: percentile(sales, 100.0 - top_pct)?,
            bottom_threshold: percentile(sales, bottom_pct)?,
        })
    }

    /// Strictly inside the band. An inverted band contains nothing.
    pub fn contains(&self, value: f64) -> bool {
        value > self.bottom_threshold && value < self.top_threshold
    }
}

/// Drop rows whose sales fall outside the band. Empty input yields no band.
pub fn apply_sales_band(
    rows: Vec<AgRow>,
    top_pct: f64,
    bottom_pct: f64,
) -> (Option<SalesBand>, FilterResult<AgRow>) {
    let sales: Vec<f64> = rows.iter().map(|r| r.record.sum_sales).collect();
    let Some(band) = SalesBand::compute(&sales, top_pct, bottom_pct) else {
        return (
            None,
            FilterResult {
                kept: rows,
                removed: Vec::new(),
            },
        );
    };

    log::debug!(
        "sales band: bottom={:.2} top={:.2} (exclude top {top_pct}%, bottom {bottom_pct}%)",
        band.bottom_threshold,
        band.top_threshold
    );

    let (kept, removed): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|r| band.contains(r.record.sum_sales));
    (Some(band), FilterResult { kept, removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AgRecord;

    fn rows_with_sales(sales: &[f64]) -> Vec<AgRow> {
        sales
            .iter()
            .enumerate()
            .map(|(i, s)| AgRow {
                record: AgRecord {
                    ag: format!("AG-{i}"),
                    sum_sales: *s,
                    ..Default::default()
                },
                cells: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert_eq!(percentile(&values, 50.0), Some(2.5));
        // rank 0.3 * 3 = 0.9
        let p30 = percentile(&values, 30.0).unwrap();
        assert!((p30 - 1.9).abs() < 1e-12, "p30 = {p30}");
    }

    #[test]
    fn percentile_ignores_input_order() {
        let values = [40.0, 10.0, 30.0, 20.0];
        assert_eq!(percentile(&values, 50.0), Some(25.0));
    }

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn zero_percent_cuts_use_min_and_max() {
        let sales = [5.0, 1.0, 9.0, 3.0];
        let band = SalesBand::compute(&sales, 0.0, 0.0).unwrap();
        assert_eq!(band.bottom_threshold, 1.0);
        assert_eq!(band.top_threshold, 9.0);
    }

    #[test]
    fn band_never_grows_the_table() {
        let rows = rows_with_sales(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
        let n = rows.len();
        let (band, result) = apply_sales_band(rows, 20.0, 30.0);
        assert!(band.is_some());
        assert!(result.kept.len() <= n);
        assert_eq!(result.kept.len() + result.removed.len(), n);
    }

    #[test]
    fn inverted_band_is_empty_not_an_error() {
        let rows = rows_with_sales(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let (band, result) = apply_sales_band(rows, 50.0, 50.0);
        let band = band.unwrap();
        assert!(band.bottom_threshold >= band.top_threshold);
        assert!(result.kept.is_empty());
    }

    #[test]
    fn empty_rows_yield_no_band() {
        let (band, result) = apply_sales_band(Vec::new(), 20.0, 30.0);
        assert!(band.is_none());
        assert!(result.kept.is_empty());
    }
}
