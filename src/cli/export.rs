use std::io::Write;

use serde_json::Value as JsonValue;

use crate::cli::wprintln;
use crate::jet::database::{Database, OpenOptions};
use crate::jet::value::Value;
use crate::JetError;

/// Options for the `jetutil export` subcommand.
pub struct ExportOptions {
    pub file: String,
    pub table: String,
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Byte(b) => JsonValue::from(*b),
        Value::Int(v) => JsonValue::from(*v),
        Value::Long(v) => JsonValue::from(*v),
        Value::Currency(v) => JsonValue::from(*v as f64 / 10_000.0),
        Value::Float(v) => JsonValue::from(*v),
        Value::Double(v) | Value::DateTime(v) => JsonValue::from(*v),
        Value::Binary(b) | Value::Memo(b) | Value::Ole(b) => JsonValue::String(crate::util::hex::format_bytes(b)),
        Value::Text(s) | Value::Guid(s) => JsonValue::String(s.clone()),
        Value::Numeric { negative, magnitude, scale } => {
            JsonValue::String(format!("{}{}e-{}", if *negative { "-" } else { "" }, crate::util::hex::format_bytes(magnitude), scale))
        }
        Value::ComplexType(id) => JsonValue::from(*id),
        Value::Unsupported(b) => JsonValue::String(crate::util::hex::format_bytes(b)),
    }
}

/// Dump every row of a table as one JSON object per line.
pub fn execute(opts: &ExportOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let db = Database::open(&opts.file, OpenOptions { read_only: true, ..Default::default() })?;
    let table = db
        .table(&opts.table)
        .ok_or_else(|| JetError::NotFound(format!("table {}", opts.table)))?;

    for (_, values) in table.scan() {
        let obj: serde_json::Map<String, JsonValue> = table
            .columns
            .iter()
            .zip(values.iter())
            .map(|(col, val)| (col.name.clone(), value_to_json(val)))
            .collect();
        wprintln!(writer, "{}", serde_json::to_string(&JsonValue::Object(obj)).unwrap())?;
    }
    Ok(())
}
