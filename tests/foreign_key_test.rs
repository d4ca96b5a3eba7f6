//! Referential integrity across three related tables: a child insert whose
//! foreign-key value has no matching parent row fails unless enforcement is
//! turned off.

use jet::jet::database::{CreateOptions, Database};
use jet::jet::table::{Column, ForeignKeyRef};
use jet::jet::value::{DataType, Value};
use tempfile::NamedTempFile;

fn id_name_columns() -> Vec<Column> {
    vec![
        Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
        Column { name: "Name".into(), ordinal: 1, data_type: DataType::Text, length: 50, nullable: true, auto_number: false, compressed_unicode: true },
    ]
}

fn child_columns(fk_name: &str) -> Vec<Column> {
    vec![
        Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
        Column { name: fk_name.into(), ordinal: 1, data_type: DataType::Long, length: 4, nullable: false, auto_number: false, compressed_unicode: true },
    ]
}

fn new_three_table_db() -> (NamedTempFile, Database) {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    let mut db = Database::create(tmp.path(), CreateOptions::default()).unwrap();

    db.create_table("Regions", id_name_columns()).unwrap();
    db.create_table("Offices", child_columns("RegionId")).unwrap();
    db.table_mut("Offices").unwrap().foreign_keys.push(ForeignKeyRef {
        name: "FK_Offices_Regions".into(),
        local_columns: vec![1],
        referenced_table: "Regions".into(),
        referenced_columns: vec![0],
        cascade_delete: false,
    });

    db.create_table("Employees", child_columns("OfficeId")).unwrap();
    db.table_mut("Employees").unwrap().foreign_keys.push(ForeignKeyRef {
        name: "FK_Employees_Offices".into(),
        local_columns: vec![1],
        referenced_table: "Offices".into(),
        referenced_columns: vec![0],
        cascade_delete: false,
    });

    (tmp, db)
}

#[test]
fn child_insert_without_matching_parent_is_rejected() {
    let (_tmp, mut db) = new_three_table_db();
    db.insert_row("Regions", vec![Value::Null, Value::Text("West".into())]).unwrap();

    let result = db.insert_row("Offices", vec![Value::Null, Value::Long(999)]);
    assert!(matches!(result, Err(jet::JetError::ReferentialIntegrityViolation(_))));
}

#[test]
fn child_insert_succeeds_against_a_real_parent_and_a_grandchild_chains_through_it() {
    let (_tmp, mut db) = new_three_table_db();
    db.insert_row("Regions", vec![Value::Null, Value::Text("West".into())]).unwrap();
    db.insert_row("Offices", vec![Value::Null, Value::Long(1)]).unwrap();
    db.insert_row("Employees", vec![Value::Null, Value::Long(1)]).unwrap();
    assert_eq!(db.table("Offices").unwrap().row_count(), 1);
    assert_eq!(db.table("Employees").unwrap().row_count(), 1);
}

#[test]
fn disabling_enforcement_allows_a_dangling_foreign_key() {
    let (_tmp, mut db) = new_three_table_db();
    db.set_enforce_foreign_keys(false);

    let result = db.insert_row("Offices", vec![Value::Null, Value::Long(999)]);
    assert!(result.is_ok());
}
