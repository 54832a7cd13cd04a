//! Seasonal enrichment: inner join on `AG`, then a sell-through cap.
//!
//! Rows without a seasonal match are dropped. A primary row matching
//! several seasonal rows is repeated once per match, in seasonal order.

use crate::{
    error::SelectResult,
    filter::{self, FilterResult, RecordFilter},
    normalizer::coerce_number,
    record::{AgRecord, AgRow},
    table::{Cell, Table},
    types::{AgId, ColumnName, COL_AG, COL_GLOBAL_STR, SEASONAL_TABLE},
};
use std::collections::HashMap;

/// Global sell-through rates keyed by AG.
#[derive(Debug, Clone, Default)]
pub struct SeasonalIndex {
    by_ag: HashMap<AgId, Vec<f64>>,
}

impl SeasonalIndex {
    /// Positions of `AG` and `Global STR (%)`, or a schema error for the
    /// first one missing.
    pub fn check_schema(table: &Table) -> SelectResult<(usize, usize)> {
        Ok((
            table.require_column(SEASONAL_TABLE, COL_AG)?,
            table.require_column(SEASONAL_TABLE, COL_GLOBAL_STR)?,
        ))
    }

    /// Index a seasonal table. Fails if `AG` or `Global STR (%)` is missing.
    pub fn build(table: &Table) -> SelectResult<Self> {
        let (ag_idx, str_idx) = Self::check_schema(table)?;

        let mut by_ag: HashMap<AgId, Vec<f64>> = HashMap::new();
        for row in table.rows() {
            let rate = match &row[str_idx] {
                Cell::Number(n) => *n,
                Cell::Text(s) => coerce_number(s).value(),
            };
            by_ag
                .entry(row[ag_idx].as_text().into_owned())
                .or_default()
                .push(rate);
        }
        Ok(Self { by_ag })
    }

    pub fn rates(&self, ag: &str) -> &[f64] {
        self.by_ag.get(ag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_ag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ag.is_empty()
    }
}

/// Keeps rows whose global sell-through is at or below the cap.
/// Rows never joined with seasonal data do not pass.
pub struct SalethroughFilter {
    pub max_salethrough: f64,
}

impl RecordFilter for SalethroughFilter {
    fn keep(&self, record: &AgRecord) -> bool {
        record
            .global_str
            .is_some_and(|rate| rate <= self.max_salethrough)
    }
}

/// Both halves of the enrichment step.
#[derive(Debug)]
pub struct Enrichment {
    /// Rows produced by the join, before the cap.
    pub matched: usize,
    /// Primary rows with no seasonal match.
    pub unmatched: Vec<AgRow>,
    /// Joined rows split by the sell-through cap.
    pub salethrough: FilterResult<AgRow>,
}

/// Join `rows` against `index` and apply the sell-through cap.
///
/// `headers` is the primary header row; `Global STR (%)` is appended to it
/// unless already present, in which case the joined value overwrites it.
pub fn enrich(
    rows: Vec<AgRow>,
    headers: &mut Vec<ColumnName>,
    index: &SeasonalIndex,
    max_salethrough: f64,
) -> Enrichment {
    let existing = headers.iter().position(|h| h == COL_GLOBAL_STR);
    if existing.is_none() {
        headers.push(COL_GLOBAL_STR.to_string());
    }

    let mut joined = Vec::new();
    let mut unmatched = Vec::new();
    for row in rows {
        let rates = index.rates(&row.record.ag);
        if rates.is_empty() {
            unmatched.push(row);
            continue;
        }
        for &rate in rates {
            let mut out = row.clone();
            out.record.global_str = Some(rate);
            match existing {
                Some(i) => out.cells[i] = Cell::Number(rate),
                None => out.cells.push(Cell::Number(rate)),
            }
            joined.push(out);
        }
    }

    log::debug!(
        "seasonal join: {} matched, {} without seasonal data",
        joined.len(),
        unmatched.len()
    );

    Enrichment {
        matched: joined.len(),
        unmatched,
        salethrough: filter::apply(&SalethroughFilter { max_salethrough }, joined),
    }
}
