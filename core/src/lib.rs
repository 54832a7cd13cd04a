//! AG selection: filter assortment groups by sales band and thresholds,
//! join seasonal sell-through, and assign two KPI focuses per survivor.

pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod kpi;
pub mod normalizer;
pub mod percentile;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod table;
pub mod types;
pub mod util;

pub use config::FilterConfig;
pub use error::{SelectError, SelectResult};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisResult};
pub use table::{Cell, Table};
