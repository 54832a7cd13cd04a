//! Numeric normalization of raw CSV text.
//!
//! Spreadsheet exports carry thousands separators, dash placeholders and
//! the occasional "N/A". Each known numeric column present in a table is
//! rewritten in place as `Cell::Number`; anything that will not parse
//! becomes 0 and is counted, per table and column, in the returned
//! `CoercionReport`.

use crate::{
    table::{Cell, Table},
    types::{ColumnName, NUMERIC_COLUMNS},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Whole-cell tokens that stand for "no value". Matched against the entire
/// cell, never as substrings, so a leading minus sign keeps `-47` negative.
const PLACEHOLDERS: &[&str] = &["—", "-", "N/A", "n/a"];

/// Count of non-empty cells that failed to parse and were zeroed,
/// keyed by table name, then column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoercionReport {
    pub failures: BTreeMap<String, BTreeMap<ColumnName, usize>>,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.failures.values().flat_map(|cols| cols.values()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Failures recorded for one column of one table.
    pub fn count(&self, table: &str, column: &str) -> usize {
        self.failures
            .get(table)
            .and_then(|cols| cols.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// Fold another report into this one, summing counts per table and column.
    pub fn merge(&mut self, other: CoercionReport) {
        for (table, columns) in other.failures {
            let entry = self.failures.entry(table).or_default();
            for (column, count) in columns {
                *entry.entry(column).or_insert(0) += count;
            }
        }
    }
}

/// Outcome of coercing a single raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    /// Parsed cleanly (placeholders and blanks count as clean zeros).
    Clean(f64),
    /// Could not be parsed; replaced by 0.
    Zeroed,
}

impl Coerced {
    pub fn value(self) -> f64 {
        match self {
            Coerced::Clean(v) => v,
            Coerced::Zeroed => 0.0,
        }
    }
}

/// Coerce one raw text value to a finite number.
pub fn coerce_number(raw: &str) -> Coerced {
    let stripped: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if stripped.is_empty() || PLACEHOLDERS.contains(&stripped.as_str()) {
        return Coerced::Clean(0.0);
    }
    match stripped.parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Clean(v),
        _ => Coerced::Zeroed,
    }
}

/// Rewrite every known numeric column of `table` as numbers.
/// Columns not present are skipped; all other columns are left alone.
pub fn normalize_numeric(table: &mut Table) -> CoercionReport {
    let mut report = CoercionReport::default();

    for column in NUMERIC_COLUMNS {
        let Some(index) = table.column_index(column) else {
            continue;
        };

        let mut failed = 0usize;
        for cell in table.column_cells_mut(index) {
            let coerced = match cell {
                Cell::Number(n) if n.is_finite() => Coerced::Clean(*n),
                Cell::Number(_) => Coerced::Zeroed,
                Cell::Text(s) => coerce_number(s),
            };
            if coerced == Coerced::Zeroed {
                failed += 1;
            }
            *cell = Cell::Number(coerced.value());
        }

        if failed > 0 {
            log::warn!(
                "'{}': {failed} unparsable value(s) in '{column}' coerced to 0",
                table.name()
            );
            report
                .failures
                .entry(table.name().to_string())
                .or_default()
                .insert((*column).to_string(), failed);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(coerce_number("1,234,567.5"), Coerced::Clean(1_234_567.5));
    }

    #[test]
    fn placeholders_become_zero() {
        for token in ["—", "-", "N/A", "n/a", ""] {
            assert_eq!(coerce_number(token), Coerced::Clean(0.0), "token {token:?}");
        }
    }

    #[test]
    fn negative_numbers_survive() {
        assert_eq!(coerce_number("-47"), Coerced::Clean(-47.0));
        assert_eq!(coerce_number("-1,250.5"), Coerced::Clean(-1250.5));
    }

    #[test]
    fn garbage_and_non_finite_are_zeroed() {
        for raw in ["abc", "12kg", "inf", "NaN", "1.2.3"] {
            assert_eq!(coerce_number(raw), Coerced::Zeroed, "raw {raw:?}");
            assert_eq!(coerce_number(raw).value(), 0.0);
        }
    }

    #[test]
    fn normalize_touches_only_numeric_columns() {
        let csv_data = "\
AG,SUM sales,Notes,Lost sales
A-1,\"2,500\",n/a,oops
B-2,—,-,100
";
        let mut table = Table::from_csv_reader("t", csv_data.as_bytes()).unwrap();
        let report = normalize_numeric(&mut table);

        let rows = table.rows();
        assert_eq!(rows[0][0], Cell::Text("A-1".into()));
        assert_eq!(rows[0][1], Cell::Number(2500.0));
        assert_eq!(rows[0][2], Cell::Text("n/a".into()));
        assert_eq!(rows[0][3], Cell::Number(0.0));
        assert_eq!(rows[1][1], Cell::Number(0.0));
        assert_eq!(rows[1][2], Cell::Text("-".into()));
        assert_eq!(rows[1][3], Cell::Number(100.0));

        assert_eq!(report.total(), 1);
        assert_eq!(report.count("t", "Lost sales"), 1);
        assert_eq!(report.count("t", "SUM sales"), 0);
    }

    #[test]
    fn merge_keeps_tables_apart() {
        let mut primary =
            Table::from_csv_reader("perf", "AG,Global STR (%)\nA,bad\n".as_bytes()).unwrap();
        let mut seasonal =
            Table::from_csv_reader("season", "AG,Global STR (%)\nA,bad\nB,worse\n".as_bytes())
                .unwrap();

        let mut report = normalize_numeric(&mut primary);
        report.merge(normalize_numeric(&mut seasonal));

        assert_eq!(report.count("perf", "Global STR (%)"), 1);
        assert_eq!(report.count("season", "Global STR (%)"), 2);
        assert_eq!(report.total(), 3);

        let mut again = report.clone();
        again.merge(report);
        assert_eq!(again.count("season", "Global STR (%)"), 4);
    }

    #[test]
    fn every_numeric_cell_is_finite_after_normalization() {
        let csv_data = "\
AG,SUM sales,SKU Qty,AVG availability (%)
x,1e400,NaN,-inf
y,12,N/A,55.5
";
        let mut table = Table::from_csv_reader("t", csv_data.as_bytes()).unwrap();
        normalize_numeric(&mut table);
        for row in table.rows() {
            for cell in &row[1..] {
                let v = cell.as_number().expect("numeric column");
                assert!(v.is_finite(), "non-finite value survived: {v}");
            }
        }
    }
}
