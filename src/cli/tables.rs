use std::io::Write;

use serde::Serialize;

use crate::cli::wprintln;
use crate::jet::database::{Database, OpenOptions};
use crate::JetError;

/// Options for the `jetutil tables` subcommand.
pub struct TablesOptions {
    pub file: String,
    pub json: bool,
}

/// List every user table's name.
pub fn execute(opts: &TablesOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let db = Database::open(&opts.file, OpenOptions { read_only: true, ..Default::default() })?;
    let names: Vec<&str> = db.table_names();

    if opts.json {
        #[derive(Serialize)]
        struct Row<'a> {
            name: &'a str,
        }
        let rows: Vec<Row> = names.iter().map(|n| Row { name: n }).collect();
        wprintln!(writer, "{}", serde_json::to_string_pretty(&rows).unwrap())?;
    } else {
        for name in names {
            wprintln!(writer, "{name}")?;
        }
    }
    Ok(())
}
