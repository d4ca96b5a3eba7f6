use std::io::Write;

use serde::Serialize;

use crate::cli::wprintln;
use crate::jet::database::{Database, OpenOptions};
use crate::JetError;

/// Options for the `jetutil validate` subcommand.
pub struct ValidateOptions {
    pub file: String,
    pub json: bool,
}

#[derive(Serialize)]
struct ValidationResult {
    table: String,
    index: usize,
    ok: bool,
    error: Option<String>,
}

/// Walk every table's indexes and confirm key ordering and uniqueness.
pub fn execute(opts: &ValidateOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let db = Database::open(&opts.file, OpenOptions { read_only: true, ..Default::default() })?;
    let mut results = Vec::new();
    let mut any_failed = false;

    for name in db.table_names() {
        let table = db.table(name).unwrap();
        for (i, index) in table.indexes.iter().enumerate() {
            let outcome = index.validate();
            any_failed |= outcome.is_err();
            results.push(ValidationResult {
                table: name.to_string(),
                index: i,
                ok: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            });
        }
    }

    if opts.json {
        wprintln!(writer, "{}", serde_json::to_string_pretty(&results).unwrap())?;
    } else {
        for r in &results {
            wprintln!(writer, "{}[{}]: {}", r.table, r.index, if r.ok { "OK" } else { r.error.as_deref().unwrap_or("FAIL") })?;
        }
    }

    if any_failed {
        return Err(JetError::CorruptedFormat("one or more indexes failed validation".into()));
    }
    Ok(())
}
