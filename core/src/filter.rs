//! Threshold filters over typed AG records.
//!
//! Each filter is one predicate over one field (or a pair of related
//! fields). Filters run in a fixed order and partition rows into kept and
//! removed sets, so the pipeline can report how many rows each stage
//! dropped. The surviving set does not depend on the order.

use crate::{config::FilterConfig, record::AgRecord, util};

/// Result of a filter operation, partitioning rows into kept and removed.
#[derive(Debug)]
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Anything a filter can evaluate: a bare record or a row carrying one.
pub trait HasRecord {
    fn record(&self) -> &AgRecord;
}

impl HasRecord for AgRecord {
    fn record(&self) -> &AgRecord {
        self
    }
}

impl HasRecord for crate::record::AgRow {
    fn record(&self) -> &AgRecord {
        &self.record
    }
}

pub trait RecordFilter: Send + Sync {
    /// Decide if this filter should run for the given configuration.
    fn enable(&self) -> bool {
        true
    }

    /// True when the record passes.
    fn keep(&self, record: &AgRecord) -> bool;

    /// Returns a stable name for logging and stage reports.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Partition `rows` with one filter. Disabled filters keep everything.
pub fn apply<C: HasRecord>(filter: &dyn RecordFilter, rows: Vec<C>) -> FilterResult<C> {
    if !filter.enable() {
        return FilterResult {
            kept: rows,
            removed: Vec::new(),
        };
    }
    let (kept, removed): (Vec<C>, Vec<C>) =
        rows.into_iter().partition(|r| filter.keep(r.record()));
    FilterResult { kept, removed }
}

// ── Filters ──────────────────────────────────────────────────────────────────

/// `AVG availability (%)` within `[min, max]`, both inclusive.
pub struct AvailabilityFilter {
    pub min: f64,
    pub max: f64,
}

impl RecordFilter for AvailabilityFilter {
    fn keep(&self, record: &AgRecord) -> bool {
        record.availability >= self.min && record.availability <= self.max
    }
}

/// Assortment richness: enough SKUs and enough distinct products.
pub struct AssortmentFilter {
    pub min_skus: f64,
    pub min_products: f64,
}

impl RecordFilter for AssortmentFilter {
    fn keep(&self, record: &AgRecord) -> bool {
        record.sku_qty >= self.min_skus && record.product_qty >= self.min_products
    }
}

/// Surplus cost strictly above the minimum.
pub struct SurplusFilter {
    pub min_surplus: f64,
}

impl RecordFilter for SurplusFilter {
    fn keep(&self, record: &AgRecord) -> bool {
        record.surplus_cost > self.min_surplus
    }
}

/// Lost sales strictly above the minimum.
pub struct LostSalesFilter {
    pub min_lost_sales: f64,
}

impl RecordFilter for LostSalesFilter {
    fn keep(&self, record: &AgRecord) -> bool {
        record.lost_sales > self.min_lost_sales
    }
}

/// Dormant days at or above the minimum age. Off when no minimum is set.
pub struct DormancyFilter {
    pub min_age: Option<f64>,
}

impl RecordFilter for DormancyFilter {
    fn enable(&self) -> bool {
        self.min_age.is_some()
    }

    fn keep(&self, record: &AgRecord) -> bool {
        self.min_age.map_or(true, |min| record.dormant_days >= min)
    }
}

/// The threshold chain in its fixed order:
/// availability, assortment, surplus, lost sales, dormancy.
pub fn threshold_chain(config: &FilterConfig) -> Vec<Box<dyn RecordFilter>> {
    vec![
        Box::new(AvailabilityFilter {
            min: config.min_availability,
            max: config.max_availability,
        }),
        Box::new(AssortmentFilter {
            min_skus: config.min_skus,
            min_products: config.min_products,
        }),
        Box::new(SurplusFilter {
            min_surplus: config.min_surplus,
        }),
        Box::new(LostSalesFilter {
            min_lost_sales: config.min_lost_sales,
        }),
        Box::new(DormancyFilter {
            min_age: config.min_age,
        }),
    ]
}
