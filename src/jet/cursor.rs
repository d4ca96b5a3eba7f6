//! Table-scan and index cursors.
//!
//! A [`Cursor`] wraps either a full table scan or an index range scan behind
//! one interface: `move_next_row`/`move_previous_row`, `find_first_row`,
//! in-place `update_current_row`/`delete_current_row`, and savepoints. Since
//! `Table`'s data pages and indexes are rebuilt in bulk rather than mutated
//! cursor-by-cursor (see `Table`'s doc comment), every positioning method
//! recomputes its ordered candidate list from current storage rather than
//! caching one, so there is no separate revalidation step to invalidate.

use crate::jet::row::{RowId, RowValues, FIRST_ROW_ID, LAST_ROW_ID};
use crate::jet::table::Table;
use crate::jet::value::Value;
use crate::JetError;

/// Where a cursor currently sits relative to the rows it iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    AtRow(RowId),
    AfterLast,
}

/// An opaque position a cursor can later be restored to. Restoring a
/// savepoint taken from a different cursor instance is rejected.
#[derive(Debug, Clone, Copy)]
pub struct Savepoint {
    cursor_id: u64,
    position: SavepointPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavepointPosition {
    BeforeFirst,
    AtRow(RowId),
    AfterLast,
}

/// Which direction the cursor's entries are produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

enum Source {
    TableScan,
    Index {
        index_ordinal: usize,
        start_key: Option<Vec<u8>>,
        end_key: Option<Vec<u8>>,
        start_inclusive: bool,
        end_inclusive: bool,
    },
}

/// A positioned iterator over a table's rows, either in physical storage
/// order (table scan) or in an index's key order, optionally bounded to a
/// key range. Holds the table mutably so that `update_current_row`/
/// `delete_current_row` can mutate it directly through the cursor.
pub struct Cursor<'a> {
    table: &'a mut Table,
    source: Source,
    direction: Direction,
    position: Position,
    cursor_id: u64,
}

static NEXT_CURSOR_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

impl<'a> Cursor<'a> {
    /// A cursor over every row in `table`, in physical storage order.
    pub fn table_scan(table: &'a mut Table, direction: Direction) -> Self {
        Cursor {
            table,
            source: Source::TableScan,
            direction,
            position: Position::BeforeFirst,
            cursor_id: NEXT_CURSOR_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        }
    }

    /// A cursor over the index at `index_ordinal`'s entries within
    /// `[start_key, end_key]`, with per-side inclusivity. A missing bound is
    /// unbounded on that side.
    pub fn index_range(
        table: &'a mut Table,
        index_ordinal: usize,
        start_key: Option<Vec<u8>>,
        start_inclusive: bool,
        end_key: Option<Vec<u8>>,
        end_inclusive: bool,
        direction: Direction,
    ) -> Self {
        Cursor {
            table,
            source: Source::Index { index_ordinal, start_key, end_key, start_inclusive, end_inclusive },
            direction,
            position: Position::BeforeFirst,
            cursor_id: NEXT_CURSOR_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        }
    }

    fn ordered_candidates(&self) -> Vec<(RowId, RowValues)> {
        match &self.source {
            Source::TableScan => {
                let mut rows = self.table.scan();
                rows.sort_by_key(|(id, _)| *id);
                if self.direction == Direction::Reverse {
                    rows.reverse();
                }
                rows
            }
            Source::Index { index_ordinal, start_key, end_key, start_inclusive, end_inclusive } => {
                let index = &self.table.indexes[*index_ordinal];
                let entries: Vec<(Vec<u8>, RowId)> = match self.direction {
                    Direction::Forward => index.iter_forward().map(|(k, r)| (k.to_vec(), r)).collect(),
                    Direction::Reverse => index.iter_reverse().map(|(k, r)| (k.to_vec(), r)).collect(),
                };
                entries
                    .into_iter()
                    .filter(|(k, _)| {
                        let after_start = match start_key {
                            None => true,
                            Some(s) => if *start_inclusive { k.as_slice() >= s.as_slice() } else { k.as_slice() > s.as_slice() },
                        };
                        let before_end = match end_key {
                            None => true,
                            Some(e) => if *end_inclusive { k.as_slice() <= e.as_slice() } else { k.as_slice() < e.as_slice() },
                        };
                        after_start && before_end
                    })
                    .filter_map(|(_, row_id)| self.table.get_row(row_id).ok().flatten().map(|v| (row_id, v)))
                    .collect()
            }
        }
    }

    /// Advance to the next row in the cursor's direction, returning its
    /// values, or `None` once past the end.
    pub fn move_next_row(&mut self) -> Result<Option<RowValues>, JetError> {
        let candidates = self.ordered_candidates();
        let next_index = match self.position {
            Position::BeforeFirst => 0,
            Position::AfterLast => return Ok(None),
            Position::AtRow(current) => {
                match candidates.iter().position(|(id, _)| *id == current) {
                    Some(i) => i + 1,
                    None => {
                        // current row vanished (deleted concurrently); find
                        // the next candidate that would have followed it.
                        candidates.iter().position(|(id, _)| *id > current).unwrap_or(candidates.len())
                    }
                }
            }
        };
        match candidates.get(next_index) {
            Some((row_id, values)) => {
                self.position = Position::AtRow(*row_id);
                Ok(Some(values.clone()))
            }
            None => {
                self.position = Position::AfterLast;
                Ok(None)
            }
        }
    }

    /// Move to the previous row, returning its values, or `None` once
    /// before the start.
    pub fn move_previous_row(&mut self) -> Result<Option<RowValues>, JetError> {
        let candidates = self.ordered_candidates();
        let prev_index = match self.position {
            Position::AfterLast => candidates.len().checked_sub(1),
            Position::BeforeFirst => return Ok(None),
            Position::AtRow(current) => match candidates.iter().position(|(id, _)| *id == current) {
                Some(0) => None,
                Some(i) => Some(i - 1),
                None => candidates.iter().rposition(|(id, _)| *id < current),
            },
        };
        match prev_index.and_then(|i| candidates.get(i)) {
            Some((row_id, values)) => {
                self.position = Position::AtRow(*row_id);
                Ok(Some(values.clone()))
            }
            None => {
                self.position = Position::BeforeFirst;
                Ok(None)
            }
        }
    }

    /// The row id the cursor currently sits on, if any.
    pub fn current_row_id(&self) -> Option<RowId> {
        match self.position {
            Position::AtRow(id) => Some(id),
            _ => None,
        }
    }

    /// The full row at the cursor's current position, or `None` if the
    /// cursor is not on a row.
    pub fn current_row(&self) -> Result<Option<RowValues>, JetError> {
        match self.current_row_id() {
            Some(id) => self.table.get_row(id),
            None => Ok(None),
        }
    }

    /// Whether the row the cursor is positioned on has been deleted out from
    /// under it since the position was recorded (e.g. by a concurrent
    /// `delete_current_row` call through another cursor over the same
    /// table). `false` if the cursor isn't on a row at all.
    pub fn is_current_row_deleted(&self) -> bool {
        match self.current_row_id() {
            Some(id) => self.table.get_row(id).ok().flatten().is_none(),
            None => false,
        }
    }

    /// Seek from the current position to the first row matching `pattern`,
    /// a per-column filter where `None` matches any value. Leaves the
    /// cursor positioned on the match (or after the last row if none match).
    pub fn find_first_row(&mut self, pattern: &[Option<Value>]) -> Result<Option<RowValues>, JetError> {
        let candidates = self.ordered_candidates();
        let found = candidates.into_iter().find(|(_, values)| {
            pattern.iter().enumerate().all(|(i, want)| match want {
                None => true,
                Some(v) => values.get(i) == Some(v),
            })
        });
        match found {
            Some((row_id, values)) => {
                self.position = Position::AtRow(row_id);
                Ok(Some(values))
            }
            None => {
                self.position = Position::AfterLast;
                Ok(None)
            }
        }
    }

    /// Replace the current row's values. The cursor follows the updated row
    /// even if the update could not preserve its `RowId`.
    pub fn update_current_row(&mut self, new_values: RowValues) -> Result<(), JetError> {
        let row_id = self
            .current_row_id()
            .ok_or_else(|| JetError::InvalidArgument("cursor is not positioned on a row".into()))?;
        let new_row_id = self.table.update_row(row_id, new_values)?;
        self.position = Position::AtRow(new_row_id);
        Ok(())
    }

    /// Delete the row at the current position. The cursor's position is left
    /// on the now-deleted `RowId`; `move_next_row`/`move_previous_row`'s
    /// existing handling for a vanished current row already seeks past it
    /// correctly.
    pub fn delete_current_row(&mut self) -> Result<(), JetError> {
        let row_id = self
            .current_row_id()
            .ok_or_else(|| JetError::InvalidArgument("cursor is not positioned on a row".into()))?;
        self.table.delete_row(row_id)
    }

    /// Reset to before the first row.
    pub fn reset(&mut self) {
        self.position = Position::BeforeFirst;
    }

    /// Capture the cursor's current position for later restoration.
    pub fn savepoint(&self) -> Savepoint {
        let position = match self.position {
            Position::BeforeFirst => SavepointPosition::BeforeFirst,
            Position::AfterLast => SavepointPosition::AfterLast,
            Position::AtRow(id) => SavepointPosition::AtRow(id),
        };
        Savepoint { cursor_id: self.cursor_id, position }
    }

    /// Restore a previously captured savepoint. Rejects a savepoint taken
    /// from a different cursor instance.
    pub fn restore_savepoint(&mut self, savepoint: Savepoint) -> Result<(), JetError> {
        if savepoint.cursor_id != self.cursor_id {
            return Err(JetError::InvalidArgument(
                "savepoint was captured from a different cursor".into(),
            ));
        }
        self.position = match savepoint.position {
            SavepointPosition::BeforeFirst => Position::BeforeFirst,
            SavepointPosition::AfterLast => Position::AfterLast,
            SavepointPosition::AtRow(id) => Position::AtRow(id),
        };
        Ok(())
    }
}

/// Sentinel row ids a cursor implicitly straddles before its first row and
/// after its last, matching [`FIRST_ROW_ID`]/[`LAST_ROW_ID`]'s total order.
pub fn bounding_row_ids() -> (RowId, RowId) {
    (FIRST_ROW_ID, LAST_ROW_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jet::index::IndexColumn;
    use crate::jet::table::Column;
    use crate::jet::value::{DataType, Value};

    fn sample_table() -> Table {
        let columns = vec![
            Column { name: "Id".into(), ordinal: 0, data_type: DataType::Long, length: 4, nullable: false, auto_number: false, compressed_unicode: true },
            Column { name: "Name".into(), ordinal: 1, data_type: DataType::Text, length: 255, nullable: true, auto_number: false, compressed_unicode: true },
        ];
        let mut table = Table::new("T", columns, 10, 4096);
        table.add_row(vec![Value::Long(3), Value::Text("c".into())], false).unwrap();
        table.add_row(vec![Value::Long(1), Value::Text("a".into())], false).unwrap();
        table.add_row(vec![Value::Long(2), Value::Text("b".into())], false).unwrap();
        table
    }

    #[test]
    fn table_scan_visits_every_row_forward() {
        let mut table = sample_table();
        let mut cursor = Cursor::table_scan(&mut table, Direction::Forward);
        let mut seen = Vec::new();
        while let Some(row) = cursor.move_next_row().unwrap() {
            seen.push(row);
        }
        assert_eq!(seen.len(), 3);
        assert!(cursor.move_next_row().unwrap().is_none());
    }

    #[test]
    fn table_scan_reverse_then_forward_returns_to_start() {
        let mut table = sample_table();
        let mut cursor = Cursor::table_scan(&mut table, Direction::Forward);
        cursor.move_next_row().unwrap();
        cursor.move_next_row().unwrap();
        let sp = cursor.savepoint();
        cursor.move_next_row().unwrap();
        cursor.restore_savepoint(sp).unwrap();
        let row = cursor.move_next_row().unwrap().unwrap();
        assert_eq!(row[1], Value::Text("b".into()));
    }

    #[test]
    fn restoring_foreign_savepoint_is_rejected() {
        let mut table_a = sample_table();
        let mut table_b = sample_table();
        let mut cursor_a = Cursor::table_scan(&mut table_a, Direction::Forward);
        let cursor_b = Cursor::table_scan(&mut table_b, Direction::Forward);
        let sp = cursor_b.savepoint();
        assert!(cursor_a.restore_savepoint(sp).is_err());
    }

    #[test]
    fn index_range_cursor_respects_bounds_and_order() {
        let mut table = sample_table();
        table.add_index(vec![IndexColumn { ordinal: 0, data_type: DataType::Long, ascending: true }], true, true, false, 50);
        for (row_id, values) in table.scan() {
            table.indexes[0].insert(&values, row_id).ok();
        }
        let columns = table.indexes[0].columns.clone();
        let start_key = crate::jet::index::encode_entry_key(&[Value::Long(1)], &columns).unwrap();
        let end_key = crate::jet::index::encode_entry_key(&[Value::Long(2)], &columns).unwrap();
        let mut cursor = Cursor::index_range(&mut table, 0, Some(start_key), true, Some(end_key), true, Direction::Forward);
        let mut ids = Vec::new();
        while let Some(row) = cursor.move_next_row().unwrap() {
            if let Value::Long(id) = row[0] {
                ids.push(id);
            }
        }
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn before_first_move_previous_stays_before_first() {
        let mut table = sample_table();
        let mut cursor = Cursor::table_scan(&mut table, Direction::Forward);
        assert!(cursor.move_previous_row().unwrap().is_none());
    }

    #[test]
    fn find_first_row_seeks_to_matching_row() {
        let mut table = sample_table();
        let mut cursor = Cursor::table_scan(&mut table, Direction::Forward);
        let found = cursor.find_first_row(&[None, Some(Value::Text("b".into()))]).unwrap();
        assert_eq!(found.unwrap()[0], Value::Long(2));
        assert_eq!(cursor.current_row().unwrap().unwrap()[1], Value::Text("b".into()));
    }

    #[test]
    fn update_current_row_and_delete_current_row() {
        let mut table = sample_table();
        let mut cursor = Cursor::table_scan(&mut table, Direction::Forward);
        cursor.find_first_row(&[Some(Value::Long(1)), None]).unwrap();
        cursor.update_current_row(vec![Value::Long(1), Value::Text("updated".into())]).unwrap();
        assert_eq!(cursor.current_row().unwrap().unwrap()[1], Value::Text("updated".into()));
        assert!(!cursor.is_current_row_deleted());
        cursor.delete_current_row().unwrap();
        assert!(cursor.is_current_row_deleted());
    }
}
