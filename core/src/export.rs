//! CSV export of output tables: header row, no index column.

use crate::{error::SelectResult, table::Table};
use std::{io::Write, path::Path};

pub fn write_table_csv<W: Write>(table: &Table, writer: W) -> SelectResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.headers())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(|c| c.as_text().into_owned()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_table_file(table: &Table, path: impl AsRef<Path>) -> SelectResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_table_csv(table, std::io::BufWriter::new(file))?;
    log::info!(
        "wrote {} rows of '{}' to {}",
        table.len(),
        table.name(),
        path.as_ref().display()
    );
    Ok(())
}

/// Render a table as CSV text.
pub fn to_csv_string(table: &Table) -> SelectResult<String> {
    let mut buf = Vec::new();
    write_table_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
