//! The analysis pipeline: one pass from raw tables to an `AnalysisResult`.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Schema check      (primary, then seasonal if supplied)
//!   2. Empty-input check (zero rows → AnalysisOutcome::NoData)
//!   3. Numeric normalization of both tables
//!   4. Sales percentile band
//!   5. Threshold chain   (availability, assortment, surplus, lost sales, dormancy)
//!   6. Seasonal join and sell-through cap (only with a seasonal table)
//!   7. KPI classification
//!   8. Aggregation
//!
//! RULES:
//!   - A run owns its tables; nothing is shared between runs.
//!   - Structural problems are errors; empty input and zero matches are not.
//!   - Every filtering stage records a StageReport.

use crate::{
    config::FilterConfig,
    enrich::{self, SeasonalIndex},
    error::SelectResult,
    filter::{self, FilterResult},
    kpi,
    normalizer::{normalize_numeric, CoercionReport},
    percentile::{apply_sales_band, SalesBand},
    record::{AgRow, PrimaryLayout},
    report::{self, ClassifiedRow, LabelAssignment, LabelSummary, Recommendation, SelectionSummary},
    table::Table,
};
use serde::Serialize;

/// Rows in and out of one filtering stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub kept: usize,
    pub removed: usize,
}

impl StageReport {
    fn record<C>(stage: &str, result: &FilterResult<C>) -> Self {
        log::info!(
            "{stage}: kept {}, removed {}",
            result.kept.len(),
            result.removed.len()
        );
        Self {
            stage: stage.to_string(),
            kept: result.kept.len(),
            removed: result.removed.len(),
        }
    }
}

/// Everything one run produced. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub config: FilterConfig,
    pub summary: SelectionSummary,
    pub sales_band: Option<SalesBand>,
    pub stages: Vec<StageReport>,
    pub coercion: CoercionReport,
    pub seasonal_enriched: bool,
    pub recommendations: Vec<Recommendation>,
    pub label_summary: Vec<LabelSummary>,
    #[serde(skip)]
    pub assignments: Vec<LabelAssignment>,
    #[serde(skip)]
    pub rows: Vec<ClassifiedRow>,
    #[serde(skip)]
    results: Table,
}

impl AnalysisResult {
    /// False is the "zero matches" condition; the result is still complete.
    pub fn has_matches(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Surviving rows with the `KPI Recommendations` column after `AG`.
    pub fn results_table(&self) -> &Table {
        &self.results
    }

    /// One row per (AG, label, rationale).
    pub fn label_table(&self) -> SelectResult<Table> {
        report::label_table(&self.assignments)
    }

    pub fn summary_table(&self) -> SelectResult<Table> {
        report::summary_table(&self.label_summary)
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// The primary table had no rows.
    NoData,
    Completed(Box<AnalysisResult>),
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::NoData => None,
            AnalysisOutcome::Completed(r) => Some(r.as_ref()),
        }
    }
}

pub struct AnalysisPipeline {
    config: FilterConfig,
}

impl AnalysisPipeline {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Run the whole pipeline. Seasonal enrichment runs only when a
    /// seasonal table is supplied.
    pub fn run(
        &self,
        mut primary: Table,
        mut seasonal: Option<Table>,
    ) -> SelectResult<AnalysisOutcome> {
        let config = &self.config;
        config.validate()?;

        let layout = PrimaryLayout::resolve(&primary, config.dormancy_enabled())?;
        if let Some(table) = &seasonal {
            SeasonalIndex::check_schema(table)?;
        }

        if primary.is_empty() {
            log::warn!("'{}' has no rows; nothing to analyse", primary.name());
            return Ok(AnalysisOutcome::NoData);
        }
        let total_ags = primary.len();
        log::info!(
            "analysing {total_ags} AGs from '{}' (seasonal: {})",
            primary.name(),
            seasonal.as_ref().map_or("none", |t| t.name())
        );

        let mut coercion = normalize_numeric(&mut primary);
        let index = match seasonal.as_mut() {
            Some(table) => {
                coercion.merge(normalize_numeric(table));
                let index = SeasonalIndex::build(table)?;
                log::debug!("seasonal index covers {} AGs", index.len());
                Some(index)
            }
            None => None,
        };

        let (mut headers, raw_rows) = primary.into_parts();
        let rows: Vec<AgRow> = raw_rows.into_iter().map(|r| layout.extract(r)).collect();

        let mut stages = Vec::new();

        let (sales_band, band) =
            apply_sales_band(rows, config.top_sales_pct, config.bottom_sales_pct);
        stages.push(StageReport::record("SalesPercentile", &band));
        let mut rows = band.kept;

        for f in filter::threshold_chain(config) {
            if !f.enable() {
                log::debug!("{} disabled", f.name());
                continue;
            }
            let result = filter::apply(f.as_ref(), rows);
            stages.push(StageReport::record(f.name(), &result));
            rows = result.kept;
        }

        if let Some(index) = &index {
            let enrichment = enrich::enrich(rows, &mut headers, index, config.max_salethrough);
            log::info!(
                "SeasonalJoin: kept {}, removed {}",
                enrichment.matched,
                enrichment.unmatched.len()
            );
            stages.push(StageReport {
                stage: "SeasonalJoin".into(),
                kept: enrichment.matched,
                removed: enrichment.unmatched.len(),
            });
            stages.push(StageReport::record("SalethroughFilter", &enrichment.salethrough));
            rows = enrichment.salethrough.kept;
        }

        let classified: Vec<ClassifiedRow> = rows
            .into_iter()
            .map(|row| ClassifiedRow {
                focus: kpi::classify(&row.record),
                row,
            })
            .collect();

        let summary = SelectionSummary::new(total_ags, classified.len());
        if classified.is_empty() {
            log::warn!("no AGs match the current criteria");
        } else {
            log::info!(
                "{} of {} AGs selected ({:.2}%)",
                summary.selected_ags,
                summary.total_ags,
                summary.selected_pct
            );
        }

        let assignments = report::label_assignments(&classified);
        let result = AnalysisResult {
            config: config.clone(),
            summary,
            sales_band,
            stages,
            coercion,
            seasonal_enriched: index.is_some(),
            recommendations: report::rank_recommendations(
                &classified,
                report::TOP_RECOMMENDATIONS,
            ),
            label_summary: report::label_summary(&assignments),
            results: report::results_table(&headers, &classified)?,
            assignments,
            rows: classified,
        };
        Ok(AnalysisOutcome::Completed(Box::new(result)))
    }
}
