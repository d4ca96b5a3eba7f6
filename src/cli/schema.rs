use std::io::Write;

use serde::Serialize;

use crate::cli::wprintln;
use crate::jet::database::{Database, OpenOptions};
use crate::JetError;

/// Options for the `jetutil schema` subcommand.
pub struct SchemaOptions {
    pub file: String,
    pub table: String,
    pub json: bool,
}

#[derive(Serialize)]
struct ColumnJson {
    name: String,
    data_type: String,
    nullable: bool,
    auto_number: bool,
}

#[derive(Serialize)]
struct IndexJson {
    unique: bool,
    primary: bool,
    column_count: usize,
}

/// Show a table's column list and indexes.
pub fn execute(opts: &SchemaOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let db = Database::open(&opts.file, OpenOptions { read_only: true, ..Default::default() })?;
    let table = db
        .table(&opts.table)
        .ok_or_else(|| JetError::NotFound(format!("table {}", opts.table)))?;

    if opts.json {
        let columns: Vec<ColumnJson> = table
            .columns
            .iter()
            .map(|c| ColumnJson {
                name: c.name.clone(),
                data_type: format!("{:?}", c.data_type),
                nullable: c.nullable,
                auto_number: c.auto_number,
            })
            .collect();
        let indexes: Vec<IndexJson> = table
            .indexes
            .iter()
            .map(|i| IndexJson { unique: i.unique, primary: i.primary, column_count: i.columns.len() })
            .collect();
        wprintln!(writer, "{}", serde_json::to_string_pretty(&(columns, indexes)).unwrap())?;
    } else {
        wprintln!(writer, "table: {}", table.name)?;
        for col in &table.columns {
            wprintln!(
                writer,
                "  {:<20} {:?}{}{}",
                col.name,
                col.data_type,
                if col.nullable { "" } else { " NOT NULL" },
                if col.auto_number { " AUTO" } else { "" }
            )?;
        }
        for (i, index) in table.indexes.iter().enumerate() {
            wprintln!(
                writer,
                "  index[{i}]: {} columns, unique={}, primary={}",
                index.columns.len(),
                index.unique,
                index.primary
            )?;
        }
    }
    Ok(())
}
