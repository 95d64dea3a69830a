use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::panel::qc::error::Result;
use crate::panel::qc::table::{SheetCell, SheetTable};

/// Writes a table as a pretty-printed JSON array of objects keyed by column.
pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    let json = table_to_json(table);
    let json_string = serde_json::to_string_pretty(&json)?;
    fs::write(path, json_string)?;
    Ok(())
}

pub fn table_to_json(table: &SheetTable) -> Value {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.clone(), cell_to_json(cell)))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

fn cell_to_json(cell: &SheetCell) -> Value {
    match cell {
        SheetCell::Blank => Value::Null,
        SheetCell::Number(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
            Value::from(*value as i64)
        }
        SheetCell::Number(value) => serde_json::Number::from_f64(*value)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SheetCell::Text(value) => Value::String(value.clone()),
    }
}
