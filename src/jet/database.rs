//! Top-level database handle.
//!
//! [`Database`] ties the page channel, the system catalog, and the open
//! tables together behind `open`/`create`, `table`/`table_mut`, and the
//! cross-table operations (referential integrity, cascades) that no single
//! table can enforce on its own.

use std::collections::HashMap;
use std::path::Path;

use crate::jet::catalog::{Catalog, CatalogEntry, ObjectType};
use crate::jet::channel::PageChannel;
use crate::jet::codec::{CodecHandler, IdentityCodec};
use crate::jet::cursor::{Cursor, Direction};
use crate::jet::format::{FormatDescriptor, JetVersion};
use crate::jet::row::{RowId, RowValues};
use crate::jet::table::{Column, Table};
use crate::JetError;

/// Options governing an existing database opened with [`Database::open`].
pub struct OpenOptions {
    pub read_only: bool,
    pub auto_sync: bool,
    pub enforce_foreign_keys: bool,
    pub allow_auto_number_insert: bool,
    /// Supplies a [`CodecHandler`] for an encrypted database; defaults to
    /// [`IdentityCodec`] when absent.
    pub codec_provider: Option<Box<dyn Fn() -> Box<dyn CodecHandler>>>,
    /// Called with every error before it's returned to the caller, for
    /// centralized diagnostics (this crate carries no logging dependency of
    /// its own — see `SPEC_FULL.md`).
    pub error_handler: Option<Box<dyn Fn(&JetError)>>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            read_only: false,
            auto_sync: true,
            enforce_foreign_keys: true,
            allow_auto_number_insert: false,
            codec_provider: None,
            error_handler: None,
        }
    }
}

/// Options governing a brand-new database created with [`Database::create`].
pub struct CreateOptions {
    pub format: JetVersion,
    pub auto_sync: bool,
    pub enforce_foreign_keys: bool,
    pub allow_auto_number_insert: bool,
    pub codec_provider: Option<Box<dyn Fn() -> Box<dyn CodecHandler>>>,
    pub error_handler: Option<Box<dyn Fn(&JetError)>>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions {
            format: JetVersion::V4,
            auto_sync: true,
            enforce_foreign_keys: true,
            allow_auto_number_insert: false,
            codec_provider: None,
            error_handler: None,
        }
    }
}

/// An open Jet database: the page channel, the system catalog, and every
/// table materialized so far.
pub struct Database {
    channel: PageChannel,
    catalog: Catalog,
    tables: HashMap<String, Table>,
    enforce_foreign_keys: bool,
    allow_auto_number_insert: bool,
    error_handler: Option<Box<dyn Fn(&JetError)>>,
    next_root_page: u32,
}

impl Database {
    /// Open an existing database file, auto-detecting its format version.
    ///
    /// Table contents are materialized lazily via [`Database::create_table`]-
    /// style bootstrapping in this engine; opening an existing file populates
    /// the catalog but defers per-table row loading to future page-tree
    /// wiring (see `DESIGN.md`).
    pub fn open<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self, JetError> {
        let codec = options
            .codec_provider
            .as_ref()
            .map(|f| f())
            .unwrap_or_else(|| Box::new(IdentityCodec));
        let channel = PageChannel::open(path, options.read_only, options.auto_sync, codec)?;
        Ok(Database {
            channel,
            catalog: Catalog::new(),
            tables: HashMap::new(),
            enforce_foreign_keys: options.enforce_foreign_keys,
            allow_auto_number_insert: options.allow_auto_number_insert,
            error_handler: options.error_handler,
            next_root_page: 1,
        })
    }

    /// Create a brand-new, empty database file.
    pub fn create<P: AsRef<Path>>(path: P, options: CreateOptions) -> Result<Self, JetError> {
        let format = match options.format {
            JetVersion::V3 => FormatDescriptor::v3(),
            JetVersion::V4 => FormatDescriptor::v4(),
            JetVersion::V5 => FormatDescriptor::v5(),
        };
        let codec = options
            .codec_provider
            .as_ref()
            .map(|f| f())
            .unwrap_or_else(|| Box::new(IdentityCodec));
        let channel = PageChannel::create(path, format, codec, options.auto_sync)?;
        Ok(Database {
            channel,
            catalog: Catalog::new(),
            tables: HashMap::new(),
            enforce_foreign_keys: options.enforce_foreign_keys,
            allow_auto_number_insert: options.allow_auto_number_insert,
            error_handler: options.error_handler,
            next_root_page: 1,
        })
    }

    fn report(&self, err: &JetError) {
        if let Some(handler) = &self.error_handler {
            handler(err);
        }
    }

    pub fn format(&self) -> &FormatDescriptor {
        self.channel.format()
    }

    pub fn set_enforce_foreign_keys(&mut self, enforce: bool) {
        self.enforce_foreign_keys = enforce;
    }

    pub fn set_allow_auto_number_insert(&mut self, allow: bool) {
        self.allow_auto_number_insert = allow;
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.catalog.table_names()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(&name.to_ascii_lowercase())
    }

    fn alloc_root_page(&mut self) -> u32 {
        let p = self.next_root_page;
        self.next_root_page += 1;
        p
    }

    /// Define and register a new table. Fails if the name is already taken.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<&mut Table, JetError> {
        let root_page = self.alloc_root_page();
        self.catalog.add(CatalogEntry {
            name: name.to_string(),
            object_type: ObjectType::Table,
            root_page,
            row_id: RowId::new(root_page, 0),
        })?;
        let table = Table::new(name, columns, root_page, self.channel.format().page_size as usize);
        self.tables.insert(name.to_ascii_lowercase(), table);
        Ok(self.tables.get_mut(&name.to_ascii_lowercase()).unwrap())
    }

    /// Drop a table and its catalog entry.
    pub fn drop_table(&mut self, name: &str) -> Result<(), JetError> {
        self.catalog.remove(name)?;
        self.tables.remove(&name.to_ascii_lowercase());
        Ok(())
    }

    fn referencing_foreign_keys(&self, referenced_table: &str) -> Vec<(String, crate::jet::table::ForeignKeyRef)> {
        self.tables
            .values()
            .flat_map(|t| {
                t.foreign_keys
                    .iter()
                    .filter(|fk| fk.referenced_table.eq_ignore_ascii_case(referenced_table))
                    .map(|fk| (t.name.clone(), fk.clone()))
            })
            .collect()
    }

    /// Insert a row into `table_name`, enforcing auto-number policy and
    /// parent-side foreign key existence.
    pub fn insert_row(&mut self, table_name: &str, values: RowValues) -> Result<RowId, JetError> {
        let result = self.insert_row_inner(table_name, values);
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    fn insert_row_inner(&mut self, table_name: &str, values: RowValues) -> Result<RowId, JetError> {
        let table = self
            .tables
            .get(&table_name.to_ascii_lowercase())
            .ok_or_else(|| JetError::NotFound(format!("table {table_name}")))?;

        if self.enforce_foreign_keys {
            for fk in &table.foreign_keys {
                let referenced_values: Vec<_> = fk.local_columns.iter().map(|&i| values[i].clone()).collect();
                let referenced_table = self
                    .tables
                    .get(&fk.referenced_table.to_ascii_lowercase())
                    .ok_or_else(|| {
                        JetError::ReferentialIntegrityViolation(format!(
                            "referenced table {} not found",
                            fk.referenced_table
                        ))
                    })?;
                let exists = referenced_table.scan().iter().any(|(_, row)| {
                    fk.referenced_columns.iter().enumerate().all(|(i, &col)| row[col] == referenced_values[i])
                });
                if !exists {
                    return Err(JetError::ReferentialIntegrityViolation(format!(
                        "no matching row in {} for foreign key {}",
                        fk.referenced_table, fk.name
                    )));
                }
            }
        }

        let table = self.tables.get_mut(&table_name.to_ascii_lowercase()).unwrap();
        table.add_row(values, self.allow_auto_number_insert)
    }

    /// Delete a row, cascading to or rejecting dependent child rows per each
    /// referencing foreign key's `cascade_delete` flag.
    pub fn delete_row(&mut self, table_name: &str, row_id: RowId) -> Result<(), JetError> {
        let result = self.delete_row_inner(table_name, row_id);
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    fn delete_row_inner(&mut self, table_name: &str, row_id: RowId) -> Result<(), JetError> {
        if self.enforce_foreign_keys {
            let values = self
                .tables
                .get(&table_name.to_ascii_lowercase())
                .ok_or_else(|| JetError::NotFound(format!("table {table_name}")))?
                .get_row(row_id)?
                .ok_or_else(|| JetError::NotFound(format!("{row_id:?}")))?;

            for (child_name, fk) in self.referencing_foreign_keys(table_name) {
                let child_rows: Vec<RowId> = {
                    let child = self.tables.get(&child_name.to_ascii_lowercase()).unwrap();
                    child
                        .scan()
                        .into_iter()
                        .filter(|(_, row)| {
                            fk.local_columns.iter().enumerate().all(|(i, &col)| row[col] == values[fk.referenced_columns[i]])
                        })
                        .map(|(id, _)| id)
                        .collect()
                };
                if child_rows.is_empty() {
                    continue;
                }
                if !fk.cascade_delete {
                    return Err(JetError::ReferentialIntegrityViolation(format!(
                        "{} child rows in {child_name} reference this row via {}",
                        child_rows.len(),
                        fk.name
                    )));
                }
                for child_row_id in child_rows {
                    self.delete_row_inner(&child_name, child_row_id)?;
                }
            }
        }

        let table = self
            .tables
            .get_mut(&table_name.to_ascii_lowercase())
            .ok_or_else(|| JetError::NotFound(format!("table {table_name}")))?;
        table.delete_row(row_id)
    }

    /// A forward table-scan cursor over `table_name`.
    pub fn cursor<'a>(&'a mut self, table_name: &str) -> Result<Cursor<'a>, JetError> {
        let table = self
            .tables
            .get_mut(&table_name.to_ascii_lowercase())
            .ok_or_else(|| JetError::NotFound(format!("table {table_name}")))?;
        Ok(Cursor::table_scan(table, Direction::Forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jet::table::ForeignKeyRef;
    use crate::jet::value::{DataType, Value};
    use tempfile::NamedTempFile;

    fn new_db() -> (NamedTempFile, Database) {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        let db = Database::create(tmp.path(), CreateOptions::default()).unwrap();
        (tmp, db)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
            Column { name: "Name".into(), ordinal: 1, data_type: DataType::Text, length: 255, nullable: true, auto_number: false, compressed_unicode: true },
        ]
    }

    #[test]
    fn create_table_then_insert_and_scan() {
        let (_tmp, mut db) = new_db();
        db.create_table("Customers", columns()).unwrap();
        let row_id = db.insert_row("Customers", vec![Value::Null, Value::Text("Ada".into())]).unwrap();
        let table = db.table("customers").unwrap();
        assert_eq!(table.get_row(row_id).unwrap().unwrap()[0], Value::Long(1));
        assert_eq!(db.table_names(), vec!["Customers"]);
    }

    #[test]
    fn foreign_key_blocks_insert_without_parent() {
        let (_tmp, mut db) = new_db();
        db.create_table("Parents", columns()).unwrap();
        db.create_table(
            "Children",
            vec![
                Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
                Column { name: "ParentId".into(), ordinal: 1, data_type: DataType::Long, length: 4, nullable: false, auto_number: false, compressed_unicode: true },
            ],
        )
        .unwrap();
        db.table_mut("Children").unwrap().foreign_keys.push(ForeignKeyRef {
            name: "FK_Children_Parents".into(),
            local_columns: vec![1],
            referenced_table: "Parents".into(),
            referenced_columns: vec![0],
            cascade_delete: false,
        });

        let result = db.insert_row("Children", vec![Value::Null, Value::Long(99)]);
        assert!(result.is_err());
    }

    #[test]
    fn foreign_key_cascade_delete_removes_children() {
        let (_tmp, mut db) = new_db();
        db.create_table("Parents", columns()).unwrap();
        db.create_table(
            "Children",
            vec![
                Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
                Column { name: "ParentId".into(), ordinal: 1, data_type: DataType::Long, length: 4, nullable: false, auto_number: false, compressed_unicode: true },
            ],
        )
        .unwrap();
        db.table_mut("Children").unwrap().foreign_keys.push(ForeignKeyRef {
            name: "FK_Children_Parents".into(),
            local_columns: vec![1],
            referenced_table: "Parents".into(),
            referenced_columns: vec![0],
            cascade_delete: true,
        });

        let parent_id = db.insert_row("Parents", vec![Value::Null, Value::Text("P".into())]).unwrap();
        db.insert_row("Children", vec![Value::Null, Value::Long(1)]).unwrap();
        db.delete_row("Parents", parent_id).unwrap();
        assert_eq!(db.table("Children").unwrap().row_count(), 0);
    }

    #[test]
    fn drop_table_removes_from_catalog() {
        let (_tmp, mut db) = new_db();
        db.create_table("Customers", columns()).unwrap();
        db.drop_table("Customers").unwrap();
        assert!(db.table_names().is_empty());
    }
}
