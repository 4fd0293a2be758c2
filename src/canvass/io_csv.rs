// Primitives for reading CSV files.

use log::debug;
use serde_json::Value as JSValue;

use crate::canvass::{io_common::*, *};

/// Reads a CSV table with a header row. Every cell is read as text.
pub fn read_csv_table(path: &str) -> CanvassResult<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!(
        "read_csv_table: {}: header: {:?}",
        simplify_file_name(path),
        header
    );

    let mut res: Vec<Row> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let mut row = Row::new();
        for (name, value) in header.iter().zip(line.iter()) {
            row.insert(name.clone(), JSValue::String(value.to_string()));
        }
        res.push(row);
    }
    debug!(
        "read_csv_table: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}
