//! Observed series from CSV files.
//!
//! A series is one named numeric column. Columns may hold prices or
//! per-step log-returns; the latter are turned into a price path with
//! [`prices_from_log_returns`] before calibration.

use jd_core::{ensure_input, errors::Result, Error, Price, Real};
use std::io;
use std::path::Path;

/// Read the column named `column` from CSV data with a header row.
///
/// Blank cells are skipped. Any other cell that does not parse as a number
/// is an error that names its row.
pub fn read_column<R: io::Read>(reader: R, column: &str) -> Result<Vec<Real>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "no column `{column}` (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let cell = record.get(index).unwrap_or("").trim();
        if cell.is_empty() {
            continue;
        }
        let value = cell.parse::<Real>().map_err(|e| {
            Error::MalformedInput(format!("row {}: `{cell}` is not a number: {e}", row + 1))
        })?;
        values.push(value);
    }
    Ok(values)
}

/// [`read_column`] on a file.
pub fn read_column_from_path<P: AsRef<Path>>(path: P, column: &str) -> Result<Vec<Real>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Runtime(format!("cannot open {}: {e}", path.display())))?;
    read_column(io::BufReader::new(file), column)
}

/// Price path starting at `base` whose log-returns are `returns`.
pub fn prices_from_log_returns(base: Price, returns: &[Real]) -> Result<Vec<Price>> {
    ensure_input!(
        base.is_finite() && base > 0.0,
        "base price must be positive, got {base}"
    );
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(base);
    let mut level = base;
    for (i, &r) in returns.iter().enumerate() {
        ensure_input!(r.is_finite(), "log-return {i} is not finite: {r}");
        level *= r.exp();
        prices.push(level);
    }
    Ok(prices)
}

fn csv_error(e: csv::Error) -> Error {
    Error::MalformedInput(format!("csv: {e}"))
}
