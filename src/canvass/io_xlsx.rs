// Primitives for reading the padron from Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use serde_json::json;

use crate::canvass::{io_common::*, *};

fn get_range(path: &str, worksheet_name: Option<&str>) -> CanvassResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let range = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    };
    range.context(OpeningExcelSnafu { path })
}

fn cell_to_json(cell: &DataType) -> JSValue {
    match cell {
        DataType::String(s) => JSValue::String(s.clone()),
        DataType::Int(i) => json!(i),
        // Excel stores the CIs and table numbers as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => json!(*f as i64),
        DataType::Float(f) => json!(f),
        DataType::Bool(b) => json!(b),
        DataType::Empty => JSValue::Null,
        _ => {
            debug!("cell_to_json: unsupported cell {:?}", cell);
            JSValue::Null
        }
    }
}

fn cell_to_header(cell: &DataType) -> String {
    match cell_to_json(cell) {
        JSValue::String(s) => s.trim().to_string(),
        JSValue::Null => String::new(),
        x => x.to_string(),
    }
}

/// Reads a worksheet whose first row holds the column names.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> CanvassResult<Vec<Row>> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(h) => h.iter().map(cell_to_header).collect(),
        None => return Ok(Vec::new()),
    };
    debug!(
        "read_excel_table: {}: header: {:?}",
        simplify_file_name(path),
        header
    );

    let mut res: Vec<Row> = Vec::new();
    for row in iter {
        let mut r = Row::new();
        for (name, cell) in header.iter().zip(row.iter()) {
            if !name.is_empty() {
                r.insert(name.clone(), cell_to_json(cell));
            }
        }
        // Trailing rows of a worksheet are often empty.
        if r.values().any(|v| !v.is_null()) {
            res.push(r);
        }
    }
    debug!(
        "read_excel_table: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}
