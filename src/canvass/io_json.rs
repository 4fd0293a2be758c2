// Primitives for reading the JSON exports of the database.

use log::{debug, warn};

use crate::canvass::{io_common::*, *};

/// Reads an array of objects. Elements that are not objects are skipped.
pub fn read_json_table(path: &str) -> CanvassResult<Vec<Row>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let elements = match js {
        JSValue::Array(l) => l,
        _ => return JsonNotTableSnafu { path }.fail(),
    };
    let mut res: Vec<Row> = Vec::new();
    for (idx, elt) in elements.into_iter().enumerate() {
        match elt {
            JSValue::Object(row) => res.push(row),
            x => {
                warn!(
                    "read_json_table: {}: skipping element {}: {:?}",
                    simplify_file_name(path),
                    idx,
                    x
                );
            }
        }
    }
    debug!(
        "read_json_table: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}
