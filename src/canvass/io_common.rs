// Conversion of the raw rows into the tables of the roster.

use log::debug;
use padron_roster::{AssignmentRecord, Person, Role};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use std::path::Path;

/// A row of a table: column name -> primitive value.
pub type Row = JSMap<String, JSValue>;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Whole floats are written without their fractional part: exports often
/// store the CIs as `1234567.0`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// The text of a cell. Blank cells and nulls are missing.
pub fn field_text(row: &Row, name: &str) -> Option<String> {
    match row.get(name) {
        Some(JSValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(JSValue::Number(n)) => Some(number_text(n)),
        Some(JSValue::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Booleans may come as JSON booleans, numbers or text.
pub fn field_bool(row: &Row, name: &str) -> bool {
    match row.get(name) {
        Some(JSValue::Bool(b)) => *b,
        Some(JSValue::Number(n)) => n.as_f64().map(|x| x != 0.0).unwrap_or(false),
        Some(JSValue::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "t" | "1" | "si" | "sí" | "yes" | "x"
        ),
        _ => false,
    }
}

pub fn validate_roll(rows: &[Row]) -> Vec<Person> {
    let res: Vec<Person> = rows
        .iter()
        .map(|row| Person {
            ci: field_text(row, "ci").unwrap_or_default(),
            first_name: field_text(row, "nombre").unwrap_or_default(),
            last_name: field_text(row, "apellido").unwrap_or_default(),
            phone: field_text(row, "telefono"),
            address: field_text(row, "direccion"),
            section: field_text(row, "seccional"),
            polling_place: field_text(row, "local_votacion"),
            table: field_text(row, "mesa"),
            order: field_text(row, "orden"),
        })
        .collect();
    debug!(
        "validate_roll: {} people, {} without ci",
        res.len(),
        res.iter().filter(|p| p.ci.is_empty()).count()
    );
    res
}

pub fn validate_assignments(rows: &[Row], role: Role) -> Vec<AssignmentRecord> {
    rows.iter()
        .map(|row| AssignmentRecord {
            ci: field_text(row, "ci").unwrap_or_default(),
            role,
            assigned_by: field_text(row, "asignado_por").unwrap_or_default(),
            coordinator_ci: field_text(row, "coordinador_ci").unwrap_or_default(),
            vote_confirmed: field_bool(row, "voto_confirmado"),
            phone: field_text(row, "telefono"),
        })
        .collect()
}
