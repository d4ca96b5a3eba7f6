use std::io::Write;

use serde::Serialize;

use crate::cli::wprintln;
use crate::jet::database::{Database, OpenOptions};
use crate::JetError;

/// Options for the `jetutil info` subcommand.
pub struct InfoOptions {
    pub file: String,
    pub json: bool,
}

#[derive(Serialize)]
struct InfoJson {
    file: String,
    version: &'static str,
    page_size: u32,
    table_count: usize,
}

/// Show the detected format version, page size, and table count for a
/// database file.
pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let db = Database::open(&opts.file, OpenOptions { read_only: true, ..Default::default() })?;
    let version = match db.format().version {
        crate::jet::format::JetVersion::V3 => "Jet 3 (.mdb, Access 97)",
        crate::jet::format::JetVersion::V4 => "Jet 4 (.mdb, Access 2000-2003)",
        crate::jet::format::JetVersion::V5 => "ACE (.accdb, Access 2007+)",
    };
    let table_count = db.table_names().len();

    if opts.json {
        let payload = InfoJson { file: opts.file.clone(), version, page_size: db.format().page_size, table_count };
        wprintln!(writer, "{}", serde_json::to_string_pretty(&payload).unwrap())?;
    } else {
        wprintln!(writer, "file:        {}", opts.file)?;
        wprintln!(writer, "version:     {version}")?;
        wprintln!(writer, "page size:   {}", db.format().page_size)?;
        wprintln!(writer, "tables:      {table_count}")?;
    }
    Ok(())
}
