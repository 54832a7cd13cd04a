//! Result aggregation: ranking, output tables and label statistics.

use crate::{
    error::SelectResult,
    kpi::{KpiFocus, KpiLabel},
    record::AgRow,
    table::{Cell, Table},
    types::{AgId, ColumnName, COL_AG, COL_KPI_FOCUS, COL_KPI_RECOMMENDATIONS, COL_RATIONALE},
    util::round_to,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many AGs are surfaced as pilot recommendations.
pub const TOP_RECOMMENDATIONS: usize = 5;

// ── Public types ─────────────────────────────────────────────────────────────

/// A surviving row with its KPI focus.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub row: AgRow,
    pub focus: KpiFocus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rank: usize,
    pub ag: AgId,
    pub sum_sales: f64,
    pub availability: f64,
    pub sku_qty: f64,
    pub product_qty: f64,
    pub surplus_cost: f64,
    pub lost_sales: f64,
    pub focus: KpiFocus,
}

/// One (AG, label) pair of the flattened label table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAssignment {
    pub ag: AgId,
    pub label: KpiLabel,
    pub rationale: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub label: KpiLabel,
    pub count: usize,
    /// Share of all assigned labels, 0–100. Unrounded.
    pub percentage: f64,
    pub rationale: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub total_ags: usize,
    pub selected_ags: usize,
    /// Percent of input AGs that survived, 0 when there was no input.
    pub selected_pct: f64,
}

impl SelectionSummary {
    pub fn new(total_ags: usize, selected_ags: usize) -> Self {
        let selected_pct = if total_ags > 0 {
            selected_ags as f64 / total_ags as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_ags,
            selected_ags,
            selected_pct,
        }
    }
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Top `k` rows by `SUM sales`, highest first. Ties keep input order.
pub fn rank_recommendations(rows: &[ClassifiedRow], k: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<&ClassifiedRow> = rows.iter().collect();
    ranked.sort_by(|a, b| b.row.record.sum_sales.total_cmp(&a.row.record.sum_sales));
    ranked
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, c)| {
            let r = &c.row.record;
            Recommendation {
                rank: i + 1,
                ag: r.ag.clone(),
                sum_sales: r.sum_sales,
                availability: r.availability,
                sku_qty: r.sku_qty,
                product_qty: r.product_qty,
                surplus_cost: r.surplus_cost,
                lost_sales: r.lost_sales,
                focus: c.focus,
            }
        })
        .collect()
}

/// The full output table: `AG`, `KPI Recommendations`, then every other
/// input column in its original order.
pub fn results_table(headers: &[ColumnName], rows: &[ClassifiedRow]) -> SelectResult<Table> {
    let ag_index = headers.iter().position(|h| h == COL_AG);
    let rest: Vec<usize> = (0..headers.len())
        .filter(|&i| Some(i) != ag_index && headers[i] != COL_KPI_RECOMMENDATIONS)
        .collect();

    let mut out_headers = vec![COL_AG.to_string(), COL_KPI_RECOMMENDATIONS.to_string()];
    out_headers.extend(rest.iter().map(|&i| headers[i].clone()));

    let mut table = Table::new("filtered_results", out_headers)?;
    for c in rows {
        let mut cells = Vec::with_capacity(rest.len() + 2);
        cells.push(Cell::Text(c.row.record.ag.clone()));
        cells.push(Cell::Text(c.focus.joined()));
        cells.extend(rest.iter().map(|&i| c.row.cells[i].clone()));
        table.push_row(cells)?;
    }
    Ok(table)
}

/// One entry per (AG, label), two per AG.
pub fn label_assignments(rows: &[ClassifiedRow]) -> Vec<LabelAssignment> {
    rows.iter()
        .flat_map(|c| {
            c.focus.labels().into_iter().map(move |label| LabelAssignment {
                ag: c.row.record.ag.clone(),
                label,
                rationale: label.rationale(),
            })
        })
        .collect()
}

/// Label frequencies over the total label count, most frequent first;
/// ties fall back to label priority.
pub fn label_summary(assignments: &[LabelAssignment]) -> Vec<LabelSummary> {
    let mut counts: BTreeMap<KpiLabel, usize> = BTreeMap::new();
    for a in assignments {
        *counts.entry(a.label).or_insert(0) += 1;
    }

    let total = assignments.len();
    let mut summary: Vec<LabelSummary> = counts
        .into_iter()
        .map(|(label, count)| LabelSummary {
            label,
            count,
            percentage: count as f64 / total as f64 * 100.0,
            rationale: label.rationale(),
        })
        .collect();
    // Stable sort keeps priority order among equal counts.
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary
}

/// Flattened label table with headers `AG`, `KPI Focus`, `Rationale`.
pub fn label_table(assignments: &[LabelAssignment]) -> SelectResult<Table> {
    let mut table = Table::new(
        "kpi_recommendations",
        vec![
            COL_AG.to_string(),
            COL_KPI_FOCUS.to_string(),
            COL_RATIONALE.to_string(),
        ],
    )?;
    for a in assignments {
        table.push_row(vec![
            Cell::Text(a.ag.clone()),
            Cell::Text(a.label.to_string()),
            Cell::from(a.rationale),
        ])?;
    }
    Ok(table)
}

/// Label summary table: `KPI`, `Count`, `Percentage`, `Rationale`.
/// Percentages are rounded to one decimal place.
pub fn summary_table(summary: &[LabelSummary]) -> SelectResult<Table> {
    let mut table = Table::new(
        "kpi_summary",
        ["KPI", "Count", "Percentage", "Rationale"]
            .map(String::from)
            .to_vec(),
    )?;
    for s in summary {
        table.push_row(vec![
            Cell::Text(s.label.to_string()),
            Cell::Number(s.count as f64),
            Cell::Number(round_to(s.percentage, 1)),
            Cell::from(s.rationale),
        ])?;
    }
    Ok(table)
}
