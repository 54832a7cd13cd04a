//! ag-runner: headless runner for the AG selection pipeline.
//!
//! Usage:
//!   ag-runner --data perf.csv --seasonal season.csv
//!   ag-runner --data perf.csv --seasonal season.csv --config filters.json --out-dir ./out
//!   ag-runner --data perf.csv --legacy --json

use ag_select_core::{
    export::write_table_file,
    pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisResult},
    util::round_to,
    FilterConfig, Table,
};
use anyhow::{bail, Context, Result};
use std::{env, path::Path};

#[derive(serde::Serialize)]
struct RunReport<'a> {
    generated_at: String,
    data: &'a str,
    seasonal: Option<&'a str>,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(data) = arg_value(&args, "--data") else {
        bail!("usage: ag-runner --data <performance.csv> [--seasonal <seasonal.csv>] [--config <filters.json>] [--out-dir <dir>] [--legacy] [--json]");
    };
    let seasonal = arg_value(&args, "--seasonal");
    let config_path = arg_value(&args, "--config");
    let out_dir = arg_value(&args, "--out-dir").unwrap_or("./out");
    let legacy = args.iter().any(|a| a == "--legacy");
    let json = args.iter().any(|a| a == "--json");

    let config = select_config(config_path, legacy)?;

    if seasonal.is_none() && !legacy {
        bail!("seasonal analysis data is required; pass --seasonal <file> (or --legacy to skip enrichment)");
    }

    if !json {
        println!("AG Selection Tool: ag-runner");
        println!("  data:      {data}");
        println!("  seasonal:  {}", seasonal.unwrap_or("(none)"));
        println!("  config:    {}", config_path.unwrap_or("(defaults)"));
        println!("  out_dir:   {out_dir}");
        println!();
    }

    let primary = Table::from_csv_path(data)?;
    let seasonal_table = seasonal.map(Table::from_csv_path).transpose()?;

    let outcome = AnalysisPipeline::new(config).run(primary, seasonal_table)?;
    let result = match outcome {
        AnalysisOutcome::NoData => {
            if json {
                println!("{}", serde_json::json!({ "status": "no_data" }));
            } else {
                println!("No data available for analysis.");
            }
            return Ok(());
        }
        AnalysisOutcome::Completed(result) => result,
    };

    export_tables(&result, Path::new(out_dir))?;

    if json {
        let report = RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            data,
            seasonal,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

/// `--legacy` always wins over a loaded file: dormancy filtering stays off.
fn select_config(path: Option<&str>, legacy: bool) -> Result<FilterConfig> {
    let config = match path {
        Some(path) => {
            let mut config = FilterConfig::load(path)?;
            if legacy {
                config.min_age = None;
            }
            config
        }
        None if legacy => FilterConfig::legacy(),
        None => FilterConfig::default(),
    };
    Ok(config)
}

fn export_tables(result: &AnalysisResult, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    write_table_file(result.results_table(), out_dir.join("filtered_results.csv"))?;
    if result.has_matches() {
        write_table_file(&result.label_table()?, out_dir.join("kpi_recommendations.csv"))?;
        write_table_file(&result.summary_table()?, out_dir.join("kpi_summary.csv"))?;
    } else {
        log::warn!("no AGs selected; only the empty results table was written");
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let s = &result.summary;
    println!("=== SUMMARY ===");
    println!("  total AGs:           {}", s.total_ags);
    println!("  meeting criteria:    {}", s.selected_ags);
    println!("  percentage selected: {}%", round_to(s.selected_pct, 2));
    if let Some(band) = &result.sales_band {
        println!(
            "  sales band:          ({:.2}, {:.2})",
            band.bottom_threshold, band.top_threshold
        );
    }
    if !result.coercion.is_clean() {
        println!(
            "  coerced to 0:        {} unparsable value(s)",
            result.coercion.total()
        );
        for (table, columns) in &result.coercion.failures {
            for (column, count) in columns {
                println!("    {table} / {column}: {count}");
            }
        }
    }

    println!();
    println!("=== FILTER FUNNEL ===");
    for stage in &result.stages {
        println!(
            "  {:<20} kept {:>5} | removed {:>5}",
            stage.stage, stage.kept, stage.removed
        );
    }

    println!();
    if !result.has_matches() {
        println!("No AGs match the current criteria. Try adjusting your parameters.");
        return;
    }

    println!("=== RECOMMENDED AGs FOR PILOT ===");
    for r in &result.recommendations {
        println!("  {}. {}", r.rank, r.ag);
        println!(
            "     Sales: ${:.2} | Availability: {:.2}%",
            r.sum_sales, r.availability
        );
        println!("     SKUs: {} | Products: {}", r.sku_qty, r.product_qty);
        println!(
            "     Surplus Cost: ${:.2} | Lost Sales: ${:.2}",
            r.surplus_cost, r.lost_sales
        );
        println!("     KPI focus: {}", r.focus.joined());
    }

    println!();
    println!("=== KPI DISTRIBUTION ===");
    for l in &result.label_summary {
        println!(
            "  {} ({}% of KPIs, {} AGs) - {}",
            l.label,
            round_to(l.percentage, 1),
            l.count,
            l.rationale
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(test: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ag-runner-{test}-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn legacy_flag_disables_dormancy_from_loaded_config() {
        let path = write_config("legacy", r#"{"top_sales_pct":0,"bottom_sales_pct":0}"#);
        let config = select_config(path.to_str(), true).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.min_age, None);
        assert!(!config.dormancy_enabled());
        assert_eq!(config.top_sales_pct, 0.0);
    }

    #[test]
    fn loaded_config_keeps_default_dormancy_without_legacy() {
        let path = write_config("plain", r#"{"top_sales_pct":5}"#);
        let config = select_config(path.to_str(), false).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.min_age, FilterConfig::default().min_age);
        assert_eq!(config.top_sales_pct, 5.0);
    }

    #[test]
    fn legacy_table_without_dormant_days_runs_with_loaded_config() {
        let path = write_config("run", r#"{"top_sales_pct":0,"bottom_sales_pct":0}"#);
        let config = select_config(path.to_str(), true).unwrap();
        std::fs::remove_file(&path).ok();

        let data = "\
AG,SUM sales,SKU Qty,Product Qty,AVG availability (%),Surplus cost,Lost sales
A,100,20,20,80,500,150
B,200,20,20,80,500,150
C,300,20,20,80,500,150
";
        let primary = Table::from_csv_reader("legacy", data.as_bytes()).unwrap();
        let outcome = AnalysisPipeline::new(config).run(primary, None).unwrap();
        let result = outcome.result().expect("rows were supplied");

        let selected: Vec<&str> = result
            .rows
            .iter()
            .map(|r| r.row.record.ag.as_str())
            .collect();
        assert_eq!(selected, ["B"]);
    }

    #[test]
    fn no_config_file_falls_back_to_defaults() {
        assert_eq!(select_config(None, false).unwrap(), FilterConfig::default());
        assert_eq!(select_config(None, true).unwrap(), FilterConfig::legacy());
    }
}
