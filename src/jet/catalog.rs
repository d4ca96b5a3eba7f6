//! The system catalog: the database-wide table of tables.
//!
//! Every Jet database carries one hidden system table listing every other
//! table's name, type, and root page/[`RowId`]. [`Catalog`] is a thin,
//! always-in-memory wrapper over that listing; `Database::open` populates it
//! by reading the catalog rows from disk, and `Database::create` seeds it
//! with just the catalog's own entry.

use crate::jet::row::RowId;
use crate::JetError;

/// What kind of object a catalog row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Table,
    SystemTable,
    LinkedTable,
}

/// One catalog row.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub object_type: ObjectType,
    pub root_page: u32,
    pub row_id: RowId,
}

/// The database-wide listing of tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog { entries: Vec::new() }
    }

    /// Register a table, failing if the name is already taken
    /// (case-insensitively, matching the product's table-name collation).
    pub fn add(&mut self, entry: CatalogEntry) -> Result<(), JetError> {
        if self.find(&entry.name).is_some() {
            return Err(JetError::InvalidArgument(format!(
                "table {} already exists in the catalog",
                entry.name
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove a table's catalog entry by name.
    pub fn remove(&mut self, name: &str) -> Result<(), JetError> {
        let before = self.entries.len();
        self.entries.retain(|e| !e.name.eq_ignore_ascii_case(name));
        if self.entries.len() == before {
            return Err(JetError::NotFound(format!("table {name} not in catalog")));
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Every user-visible table name (system tables excluded), in catalog order.
    pub fn table_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.object_type == ObjectType::Table)
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, page: u32) -> CatalogEntry {
        CatalogEntry { name: name.into(), object_type: ObjectType::Table, root_page: page, row_id: RowId::new(1, page as u16) }
    }

    #[test]
    fn add_then_find_is_case_insensitive() {
        let mut cat = Catalog::new();
        cat.add(entry("Customers", 10)).unwrap();
        assert!(cat.find("customers").is_some());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut cat = Catalog::new();
        cat.add(entry("Customers", 10)).unwrap();
        assert!(cat.add(entry("CUSTOMERS", 20)).is_err());
    }

    #[test]
    fn table_names_excludes_system_tables() {
        let mut cat = Catalog::new();
        cat.add(entry("Customers", 10)).unwrap();
        cat.add(CatalogEntry { name: "MSysObjects".into(), object_type: ObjectType::SystemTable, root_page: 2, row_id: RowId::new(1, 0) })
            .unwrap();
        assert_eq!(cat.table_names(), vec!["Customers"]);
    }

    #[test]
    fn remove_missing_table_errors() {
        let mut cat = Catalog::new();
        assert!(cat.remove("Ghost").is_err());
    }
}
