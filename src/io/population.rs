use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::prelude::{CsvReader, DataType, SerReader};
use tracing::info;

/// One subzone row from the census population table.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationRow {
    pub planning_area: Option<String>,
    pub subzone: String,
    pub population: f64,
}

/// Key used to match table rows to evaluation units: trimmed, upper-cased.
#[inline]
pub fn join_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Clean a population cell: strip thousands separators; `-`, blank or unparsable count as 0.
pub fn clean_count(cell: Option<&str>) -> f64 {
    let cleaned: String = cell.unwrap_or("").trim().chars().filter(|c| *c != ',').collect();
    match cleaned.as_str() {
        "" | "-" => 0.0,
        s => s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0),
    }
}

/// Classify table rows into subzones.
///
/// The grand-total row (`Total`) is dropped. Planning-area subtotal rows
/// (`<area> - Total`) are dropped, and their area name is carried onto the
/// subzone rows that follow.
pub fn classify_rows<'a>(
    rows: impl IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
) -> Vec<PopulationRow> {
    let mut planning_area: Option<String> = None;
    let mut subzones = Vec::new();

    for (name, total) in rows {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else { continue };
        if name.eq_ignore_ascii_case("total") { continue }
        if let Some(area) = name.strip_suffix(" - Total") {
            planning_area = Some(area.trim().to_string());
            continue;
        }
        subzones.push(PopulationRow {
            planning_area: planning_area.clone(),
            subzone: name.to_string(),
            population: clean_count(total),
        });
    }
    subzones
}

/// Read the population CSV at `path` and classify its rows.
/// `name_column` holds row labels, `total_column` the population totals.
pub fn read_population_csv(path: &Path, name_column: &str, total_column: &str) -> Result<Vec<PopulationRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open population table: {}", path.display()))?;
    let df = CsvReader::new(file)
        .finish()
        .with_context(|| format!("Failed to parse population table: {}", path.display()))?;

    let names = df.column(name_column)
        .with_context(|| format!("Population table has no column `{name_column}`"))?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let totals = df.column(total_column)
        .with_context(|| format!("Population table has no column `{total_column}`"))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let rows = classify_rows(names.str()?.into_iter().zip(totals.str()?.into_iter()));
    info!(path = %path.display(), rows = df.height(), subzones = rows.len(), "read population table");
    Ok(rows)
}
