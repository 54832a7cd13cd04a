//! Typed view of one assortment-group row.
//!
//! The pipeline filters and classifies on `AgRecord` but carries the raw
//! `cells` alongside, so every input column survives to the output table.

use crate::{
    error::SelectResult,
    table::{Cell, Table},
    types::{
        AgId, COL_AG, COL_AVAILABILITY, COL_DORMANT_DAYS, COL_LOST_SALES, COL_PRODUCT_QTY,
        COL_SKU_QTY, COL_SUM_SALES, COL_SURPLUS_COST, PRIMARY_TABLE,
    },
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgRecord {
    pub ag: AgId,
    pub sum_sales: f64,
    pub sku_qty: f64,
    pub product_qty: f64,
    /// Average availability, percent 0–100.
    pub availability: f64,
    /// 0 when the input has no dormancy column.
    pub dormant_days: f64,
    pub surplus_cost: f64,
    pub lost_sales: f64,
    /// Sell-through rate, set once the row is joined with seasonal data.
    pub global_str: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgRow {
    pub record: AgRecord,
    pub cells: Vec<Cell>,
}

/// Column positions of the required fields in the primary table.
#[derive(Debug, Clone)]
pub struct PrimaryLayout {
    ag: usize,
    sum_sales: usize,
    sku_qty: usize,
    product_qty: usize,
    availability: usize,
    dormant_days: Option<usize>,
    surplus_cost: usize,
    lost_sales: usize,
}

impl PrimaryLayout {
    /// Resolve required columns, failing on the first one missing.
    /// `Dormant days` is required only when dormancy filtering is on.
    pub fn resolve(table: &Table, require_dormancy: bool) -> SelectResult<Self> {
        let dormant_days = if require_dormancy {
            Some(table.require_column(PRIMARY_TABLE, COL_DORMANT_DAYS)?)
        } else {
            table.column_index(COL_DORMANT_DAYS)
        };
        Ok(Self {
            ag: table.require_column(PRIMARY_TABLE, COL_AG)?,
            sum_sales: table.require_column(PRIMARY_TABLE, COL_SUM_SALES)?,
            sku_qty: table.require_column(PRIMARY_TABLE, COL_SKU_QTY)?,
            product_qty: table.require_column(PRIMARY_TABLE, COL_PRODUCT_QTY)?,
            availability: table.require_column(PRIMARY_TABLE, COL_AVAILABILITY)?,
            dormant_days,
            surplus_cost: table.require_column(PRIMARY_TABLE, COL_SURPLUS_COST)?,
            lost_sales: table.require_column(PRIMARY_TABLE, COL_LOST_SALES)?,
        })
    }

    pub fn ag_index(&self) -> usize {
        self.ag
    }

    /// Build a row from normalized cells.
    pub fn extract(&self, cells: Vec<Cell>) -> AgRow {
        let num = |i: usize| cells.get(i).and_then(Cell::as_number).unwrap_or(0.0);
        let record = AgRecord {
            ag: cells
                .get(self.ag)
                .map(|c| c.as_text().into_owned())
                .unwrap_or_default(),
            sum_sales: num(self.sum_sales),
            sku_qty: num(self.sku_qty),
            product_qty: num(self.product_qty),
            availability: num(self.availability),
            dormant_days: self.dormant_days.map(num).unwrap_or(0.0),
            surplus_cost: num(self.surplus_cost),
            lost_sales: num(self.lost_sales),
            global_str: None,
        };
        AgRow { record, cells }
    }
}
