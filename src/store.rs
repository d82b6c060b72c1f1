//! Intermediate tables: one CSV per section, the only hand-off between the
//! extraction and the projection stage.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::parser::records::TradeRecord;
use crate::parser::sections::Section;

pub const COLUMNS: [&str; 8] = [
    "Description of Property",
    "Date Acquired",
    "Date Disposed",
    "Proceeds",
    "Cost Basis",
    "Code",
    "Amount of Adjustment",
    "Gain/Loss",
];

pub fn table_path(dir: &Path, section: Section) -> PathBuf {
    dir.join(format!("{}.csv", section.file_stem()))
}

/// Write one section's table. A section without records still gets its header.
pub fn write_section(path: &Path, records: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record).with_context(|| "writing record")?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Rows of one section's table, header excluded, in file order.
pub fn read_section(path: &Path) -> Result<Vec<TradeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: TradeRecord = row.with_context(|| format!("reading {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Numeric cell value: thousands separators stripped, anything unparseable is zero.
pub fn coerce_amount(cell: &str) -> Decimal {
    let cleaned = cell.trim().replace(',', "");
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

// ── Tests ──
