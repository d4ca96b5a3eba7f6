//! A table large enough to span thousands of data pages keeps an accurate
//! row count and promotes its owned-pages usage map from inline to
//! reference encoding once the page span outgrows inline capacity.

use jet::jet::database::{CreateOptions, Database};
use jet::jet::table::Column;
use jet::jet::usage_map::UsageMapEncoding;
use jet::jet::value::{DataType, Value};
use tempfile::NamedTempFile;

fn columns() -> Vec<Column> {
    vec![
        Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: true, compressed_unicode: true },
        Column { name: "Payload".into(), ordinal: 1, data_type: DataType::Binary, length: 0, nullable: true, auto_number: false, compressed_unicode: true },
    ]
}

#[test]
fn three_hundred_thousand_rows_keep_an_accurate_count_and_promote_the_usage_map() {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::remove_file(tmp.path()).ok();
    let mut db = Database::create(tmp.path(), CreateOptions::default()).unwrap();
    db.create_table("Huge", columns()).unwrap();

    let payload = vec![0x5Au8; 290];
    for _ in 0..300_000 {
        db.insert_row("Huge", vec![Value::Null, Value::Binary(payload.clone())]).unwrap();
    }

    let table = db.table("Huge").unwrap();
    assert_eq!(table.row_count(), 300_000);
    assert_eq!(table.owned_pages().encoding(), UsageMapEncoding::Reference);
}
