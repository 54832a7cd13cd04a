//! Filter configuration for one analysis run.
//!
//! Every field has a serde default, so a JSON file only needs to name the
//! thresholds it changes. Load with `FilterConfig::load`; in tests use
//! `FilterConfig::default()` directly.

use crate::error::{SelectError, SelectResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Percent of AGs to exclude from the top of the sales distribution.
    pub top_sales_pct: f64,
    /// Percent of AGs to exclude from the bottom of the sales distribution.
    pub bottom_sales_pct: f64,
    pub min_availability: f64,
    pub max_availability: f64,
    pub min_skus: f64,
    pub min_products: f64,
    /// Surplus cost must be strictly above this.
    pub min_surplus: f64,
    /// Lost sales must be strictly above this.
    pub min_lost_sales: f64,
    /// Minimum dormant days. `None` turns dormancy filtering off.
    pub min_age: Option<f64>,
    /// Maximum global sell-through rate, applied after the seasonal join.
    pub max_salethrough: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            top_sales_pct: 20.0,
            bottom_sales_pct: 30.0,
            min_availability: 50.0,
            max_availability: 95.0,
            min_skus: 10.0,
            min_products: 10.0,
            min_surplus: 100.0,
            min_lost_sales: 100.0,
            min_age: Some(30.0),
            max_salethrough: 80.0,
        }
    }
}

impl FilterConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> SelectResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: FilterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config without the dormancy stage, matching the older tool.
    pub fn legacy() -> Self {
        Self {
            min_age: None,
            ..Self::default()
        }
    }

    pub fn dormancy_enabled(&self) -> bool {
        self.min_age.is_some()
    }

    /// Reject values outside the ranges the thresholds are defined on.
    pub fn validate(&self) -> SelectResult<()> {
        check_range("top_sales_pct", self.top_sales_pct, 0.0, 50.0)?;
        check_range("bottom_sales_pct", self.bottom_sales_pct, 0.0, 50.0)?;
        check_range("min_availability", self.min_availability, 0.0, 100.0)?;
        check_range("max_availability", self.max_availability, 0.0, 100.0)?;
        check_range("max_salethrough", self.max_salethrough, 0.0, 100.0)?;
        check_range("min_skus", self.min_skus, 0.0, f64::MAX)?;
        check_range("min_products", self.min_products, 0.0, f64::MAX)?;
        check_range("min_surplus", self.min_surplus, 0.0, f64::MAX)?;
        check_range("min_lost_sales", self.min_lost_sales, 0.0, f64::MAX)?;
        if let Some(age) = self.min_age {
            check_range("min_age", age, 0.0, f64::MAX)?;
        }
        if self.min_availability > self.max_availability {
            return Err(SelectError::InvalidConfig {
                field: "min_availability".into(),
                message: format!(
                    "{} is above max_availability {}",
                    self.min_availability, self.max_availability
                ),
            });
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> SelectResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SelectError::InvalidConfig {
            field: field.into(),
            message: format!("{value} is outside [{min}, {max}]"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let c = FilterConfig::default();
        assert_eq!(c.top_sales_pct, 20.0);
        assert_eq!(c.bottom_sales_pct, 30.0);
        assert_eq!((c.min_availability, c.max_availability), (50.0, 95.0));
        assert_eq!((c.min_skus, c.min_products), (10.0, 10.0));
        assert_eq!((c.min_surplus, c.min_lost_sales), (100.0, 100.0));
        assert_eq!(c.min_age, Some(30.0));
        assert_eq!(c.max_salethrough, 80.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let c: FilterConfig =
            serde_json::from_str(r#"{ "top_sales_pct": 10, "min_age": null }"#).unwrap();
        assert_eq!(c.top_sales_pct, 10.0);
        assert_eq!(c.bottom_sales_pct, 30.0);
        assert!(!c.dormancy_enabled());
    }

    #[test]
    fn out_of_range_percentile_rejected() {
        let c = FilterConfig {
            top_sales_pct: 60.0,
            ..FilterConfig::default()
        };
        let err = c.validate().unwrap_err();
        assert!(
            matches!(&err, SelectError::InvalidConfig { field, .. } if field == "top_sales_pct"),
            "got {err:?}"
        );
    }

    #[test]
    fn inverted_availability_range_rejected() {
        let c = FilterConfig {
            min_availability: 90.0,
            max_availability: 60.0,
            ..FilterConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn legacy_config_has_no_dormancy_stage() {
        assert!(!FilterConfig::legacy().dormancy_enabled());
        assert!(FilterConfig::default().dormancy_enabled());
    }
}
