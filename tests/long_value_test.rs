//! Memo/OLE content past the inline threshold spills to dedicated long-value
//! pages and round-trips exactly through the full `Database` API; updating a
//! spilled value preserves the row's identity and index membership.

use jet::jet::database::{CreateOptions, Database};
use jet::jet::index::IndexColumn;
use jet::jet::table::Column;
use jet::jet::value::{DataType, Value};
use tempfile::NamedTempFile;

fn columns() -> Vec<Column> {
    vec![
        Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
        Column { name: "Body".into(), ordinal: 1, data_type: DataType::Memo, length: 0, nullable: true, auto_number: false, compressed_unicode: true },
        Column { name: "Attachment".into(), ordinal: 2, data_type: DataType::Ole, length: 0, nullable: true, auto_number: false, compressed_unicode: true },
    ]
}

fn new_db() -> (NamedTempFile, Database) {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    let db = Database::create(tmp.path(), CreateOptions::default()).unwrap();
    (tmp, db)
}

#[test]
fn a_long_text_value_round_trips_exactly() {
    let (_tmp, mut db) = new_db();
    db.create_table("Docs", columns()).unwrap();

    let text: String = "the quick brown fox jumps over the lazy dog. ".repeat(45); // > 2000 chars
    assert!(text.len() > 2000);
    let row_id = db.insert_row("Docs", vec![Value::Null, Value::Memo(text.clone().into_bytes()), Value::Null]).unwrap();

    let table = db.table("Docs").unwrap();
    assert_eq!(table.get_row(row_id).unwrap().unwrap()[1], Value::Memo(text.into_bytes()));
}

#[test]
fn a_multi_kilobyte_ole_blob_round_trips_exactly() {
    let (_tmp, mut db) = new_db();
    db.create_table("Docs", columns()).unwrap();

    let blob: Vec<u8> = (0..8_000u32).map(|i| (i % 256) as u8).collect();
    let row_id = db.insert_row("Docs", vec![Value::Null, Value::Null, Value::Ole(blob.clone())]).unwrap();

    let table = db.table("Docs").unwrap();
    assert_eq!(table.get_row(row_id).unwrap().unwrap()[2], Value::Ole(blob));
}

#[test]
fn updating_a_spilled_value_preserves_row_identity_and_index_membership() {
    let (_tmp, mut db) = new_db();
    db.create_table("Docs", columns()).unwrap();
    db.table_mut("Docs").unwrap().add_index(
        vec![IndexColumn { ordinal: 0, data_type: DataType::Long, ascending: true }],
        true,
        true,
        false,
        20,
    );

    let small: Vec<u8> = vec![0x11; 100];
    let bigger: Vec<u8> = (0..200u32).map(|i| (i % 256) as u8).collect();
    let row_id = db.insert_row("Docs", vec![Value::Null, Value::Memo(small), Value::Null]).unwrap();

    let table = db.table_mut("Docs").unwrap();
    let new_id = table.update_row(row_id, vec![Value::Long(1), Value::Memo(bigger.clone()), Value::Null]).unwrap();

    assert_eq!(new_id, row_id, "growing a spilled value must preserve row identity and index membership");
    assert_eq!(table.get_row(new_id).unwrap().unwrap()[1], Value::Memo(bigger));
    assert_eq!(table.indexes[0].entry_count(), 1);
}
