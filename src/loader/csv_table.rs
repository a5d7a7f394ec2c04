use std::path::Path;

use serde::de::DeserializeOwned;

use crate::core::HoldingsError;

/// A CSV table decoded into raw rows, plus the header names it carried.
pub(crate) struct CsvTable<R> {
    pub headers: Vec<String>,
    pub rows: Vec<R>,
}

impl<R> CsvTable<R> {
    pub(crate) fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

pub(crate) fn read<R: DeserializeOwned>(
    path: &Path,
    required: &[&str],
) -> Result<CsvTable<R>, HoldingsError> {
    let input = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| HoldingsError::unavailable(&input, e.to_string()))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| HoldingsError::unavailable(&input, e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    super::wire::require_columns(&input, headers.iter().map(String::as_str), required)?;
    // Header names may have been cleaned above; decode against the cleaned set.
    rdr.set_headers(csv::StringRecord::from(headers.clone()));

    let mut rows = Vec::new();
    for (i, rec) in rdr.deserialize::<R>().enumerate() {
        let row = rec.map_err(|e| HoldingsError::Schema {
            input: input.clone(),
            row: i + 1,
            column: e
                .position()
                .map_or_else(String::new, |p| format!("line {}", p.line())),
            reason: e.to_string(),
        })?;
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}
