//! Shared primitive types and column names used across the pipeline.

/// An assortment group identifier. Join key between the two tables.
pub type AgId = String;

/// A header name in an input or output table.
pub type ColumnName = String;

// ── Primary table columns ────────────────────────────────────────────────────

pub const COL_AG: &str = "AG";
pub const COL_SUM_SALES: &str = "SUM sales";
pub const COL_SKU_QTY: &str = "SKU Qty";
pub const COL_PRODUCT_QTY: &str = "Product Qty";
pub const COL_AVAILABILITY: &str = "AVG availability (%)";
pub const COL_DORMANT_DAYS: &str = "Dormant days";
pub const COL_SURPLUS_COST: &str = "Surplus cost";
pub const COL_LOST_SALES: &str = "Lost sales";

// ── Seasonal table columns ───────────────────────────────────────────────────

pub const COL_GLOBAL_STR: &str = "Global STR (%)";

// ── Derived output columns ───────────────────────────────────────────────────

pub const COL_KPI_RECOMMENDATIONS: &str = "KPI Recommendations";
pub const COL_KPI_FOCUS: &str = "KPI Focus";
pub const COL_RATIONALE: &str = "Rationale";

/// Every column the normalizer will coerce to a number when present.
pub const NUMERIC_COLUMNS: &[&str] = &[
    COL_SUM_SALES,
    COL_SURPLUS_COST,
    COL_LOST_SALES,
    COL_SKU_QTY,
    COL_PRODUCT_QTY,
    COL_AVAILABILITY,
    COL_DORMANT_DAYS,
    "AVG age days",
    "Total sales (£)",
    "Total sales (units)",
    COL_GLOBAL_STR,
    "Global Discount STR (%)",
    "Global Full price STR (%)",
    "Local STR (%)",
    "Local Discount STR (%)",
    "Local Full Price STR (%)",
];

/// Table labels used in error messages.
pub const PRIMARY_TABLE: &str = "performance";
pub const SEASONAL_TABLE: &str = "seasonal";
