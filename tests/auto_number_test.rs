//! Auto-number sequencing: generated by default regardless of what a caller
//! supplies, honored and ratcheted forward only once explicitly allowed.

use jet::jet::database::{CreateOptions, Database};
use jet::jet::table::Column;
use jet::jet::value::{DataType, Value};
use tempfile::NamedTempFile;

fn columns() -> Vec<Column> {
    vec![
        Column { name: "a".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
        Column { name: "name".into(), ordinal: 1, data_type: DataType::Text, length: 50, nullable: true, auto_number: false, compressed_unicode: true },
    ]
}

fn new_db() -> (NamedTempFile, Database) {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    let db = Database::create(tmp.path(), CreateOptions::default()).unwrap();
    (tmp, db)
}

#[test]
fn explicit_values_are_ignored_while_generation_stays_sequential() {
    let (_tmp, mut db) = new_db();
    db.create_table("T", columns()).unwrap();

    let r1 = db.insert_row("T", vec![Value::Null, Value::Text("row1".into())]).unwrap();
    let r2 = db.insert_row("T", vec![Value::Long(13), Value::Text("row2".into())]).unwrap();
    let r3 = db.insert_row("T", vec![Value::Text("flubber".into()), Value::Text("row3".into())]).unwrap();

    let table = db.table("T").unwrap();
    assert_eq!(table.get_row(r1).unwrap().unwrap()[0], Value::Long(1));
    assert_eq!(table.get_row(r2).unwrap().unwrap()[0], Value::Long(2));
    assert_eq!(table.get_row(r3).unwrap().unwrap()[0], Value::Long(3));
}

#[test]
fn enabling_explicit_insert_honors_and_ratchets_the_counter() {
    let (_tmp, mut db) = new_db();
    db.create_table("T", columns()).unwrap();
    db.set_allow_auto_number_insert(true);

    let r1 = db.insert_row("T", vec![Value::Long(100), Value::Text("row1".into())]).unwrap();
    let r2 = db.insert_row("T", vec![Value::Null, Value::Text("row2".into())]).unwrap();

    let table = db.table("T").unwrap();
    assert_eq!(table.get_row(r1).unwrap().unwrap()[0], Value::Long(100));
    assert_eq!(table.get_row(r2).unwrap().unwrap()[0], Value::Long(101));
}

#[test]
fn enabling_explicit_insert_still_rejects_a_non_positive_value() {
    let (_tmp, mut db) = new_db();
    db.create_table("T", columns()).unwrap();
    db.set_allow_auto_number_insert(true);

    let result = db.insert_row("T", vec![Value::Long(-1), Value::Text("row1".into())]);
    assert!(result.is_err());
}

#[test]
fn an_explicit_value_never_regresses_a_counter_already_ahead_of_it() {
    let (_tmp, mut db) = new_db();
    db.create_table("T", columns()).unwrap();
    db.set_allow_auto_number_insert(true);

    db.insert_row("T", vec![Value::Long(500), Value::Text("row1".into())]).unwrap();
    let r2 = db.insert_row("T", vec![Value::Long(2), Value::Text("row2".into())]).unwrap();
    let r3 = db.insert_row("T", vec![Value::Null, Value::Text("row3".into())]).unwrap();

    let table = db.table("T").unwrap();
    assert_eq!(table.get_row(r2).unwrap().unwrap()[0], Value::Long(2));
    assert_eq!(table.get_row(r3).unwrap().unwrap()[0], Value::Long(501));
}
