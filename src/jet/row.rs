//! Data page layout and row packing.
//!
//! A data page holds a header, a row directory that grows backward from the
//! end of the page, and row bytes packed forward from just after the header.
//! [`pack_row`]/[`unpack_row`] implement the exact byte layout existing files
//! depend on: column count, fixed-length values, a NULL bitmap, variable-length
//! values, a variable-length offset table, and the variable-length count.

use byteorder::{ByteOrder, LittleEndian};

use crate::jet::constants::*;
use crate::jet::value::{self, DataType, Value};
use crate::JetError;

/// `(pageNumber, rowNumber)` — the sole addressing scheme for a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId {
    pub page_number: u32,
    pub row_number: u16,
}

impl RowId {
    pub fn new(page_number: u32, row_number: u16) -> Self {
        RowId { page_number, row_number }
    }
}

/// Sentinel that orders strictly before any real [`RowId`].
pub const FIRST_ROW_ID: RowId = RowId { page_number: 0, row_number: 0 };
/// Sentinel that orders strictly after any real [`RowId`]. No real page ever
/// reaches `u32::MAX`, since [`crate::jet::constants::INVALID_PAGE_MARKER`]
/// reserves that value for deallocated pages.
pub const LAST_ROW_ID: RowId = RowId { page_number: u32::MAX, row_number: u16::MAX };

/// A column's physical layout, independent of its name or indexing role
/// (those live on [`crate::jet::table::Column`], which wraps this).
#[derive(Debug, Clone, Copy)]
pub struct ColumnLayout {
    /// Position in the fixed-length-column / NULL-bitmap ordering.
    pub ordinal: usize,
    pub data_type: DataType,
    /// Declared length for fixed-width or max length for variable-width columns.
    pub length: usize,
    /// Whether a `Text` column may use the compressed-ASCII encoding.
    pub compressed_unicode: bool,
}

impl ColumnLayout {
    fn is_variable(&self) -> bool {
        self.data_type.fixed_width().is_none()
    }
}

/// One row's decoded column values, indexed by ordinal.
pub type RowValues = Vec<Value>;

/// Pack column values into the on-disk row byte layout (not including the
/// row-directory entry — that is maintained by [`DataPage`]).
///
/// Layout: 2-byte column count, fixed-length values in definition order,
/// `ceil(N/8)`-byte NULL bitmap (bit set means NULL, except `Boolean`
/// columns where bit clear means NULL, per the Boolean encoding convention —
/// see `DESIGN.md`), variable-length values packed tightly, a variable-length
/// offset table (counted from the end of the row, one `u16` per var-length
/// column plus a trailing sentinel), and finally the var-length count.
pub fn pack_row(columns: &[ColumnLayout], values: &[Value]) -> Result<Vec<u8>, JetError> {
    if columns.len() != values.len() {
        return Err(JetError::InvalidArgument(format!(
            "expected {} values, got {}",
            columns.len(),
            values.len()
        )));
    }

    let mut fixed = Vec::new();
    let mut null_bitmap = vec![0u8; columns.len().div_ceil(8)];
    let mut var_values: Vec<Vec<u8>> = Vec::new();

    for (i, (col, val)) in columns.iter().zip(values.iter()).enumerate() {
        let is_null = matches!(val, Value::Null);
        let bit_set = match col.data_type {
            // Boolean: 0 = true, 1 = false is the *value* convention; the
            // bitmap bit itself still follows "set means absent/NULL or
            // false" — true is bit clear.
            DataType::Boolean => !matches!(val, Value::Boolean(true)),
            _ => is_null,
        };
        if bit_set {
            null_bitmap[i / 8] |= 1 << (i % 8);
        }

        if col.data_type == DataType::Boolean {
            continue; // no row bytes; lives entirely in the NULL bitmap
        }

        if is_null {
            if col.is_variable() {
                var_values.push(Vec::new());
            } else {
                fixed.extend(std::iter::repeat_n(0u8, col.data_type.fixed_width().unwrap_or(0)));
            }
            continue;
        }

        let encoded = value::encode(val, col.data_type, col.compressed_unicode)?;
        if col.is_variable() {
            var_values.push(encoded);
        } else {
            let width = col.data_type.fixed_width().unwrap_or(encoded.len());
            if encoded.len() != width {
                return Err(JetError::ValueOutOfRange(format!(
                    "column {} expected {width} fixed bytes, encoded {}",
                    col.ordinal,
                    encoded.len()
                )));
            }
            fixed.extend_from_slice(&encoded);
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(&(columns.len() as u16).to_le_bytes());
    out.extend_from_slice(&fixed);
    out.extend_from_slice(&null_bitmap);

    let var_count = var_values.len();
    let mut var_blob = Vec::new();
    let mut offsets = Vec::with_capacity(var_count + 1);
    for v in &var_values {
        offsets.push(var_blob.len() as u16);
        var_blob.extend_from_slice(v);
    }
    offsets.push(var_blob.len() as u16);

    out.extend_from_slice(&var_blob);
    for off in offsets.iter().rev() {
        out.extend_from_slice(&off.to_le_bytes());
    }
    out.extend_from_slice(&(var_count as u16).to_le_bytes());

    Ok(out)
}

/// Inverse of [`pack_row`].
pub fn unpack_row(bytes: &[u8], columns: &[ColumnLayout]) -> Result<RowValues, JetError> {
    if bytes.len() < 2 {
        return Err(JetError::CorruptedFormat("row too short for column count".into()));
    }
    let declared_count = LittleEndian::read_u16(&bytes[0..2]) as usize;
    if declared_count != columns.len() {
        return Err(JetError::CorruptedFormat(format!(
            "row declares {declared_count} columns, schema has {}",
            columns.len()
        )));
    }

    if bytes.len() < 2 {
        return Err(JetError::CorruptedFormat("row truncated".into()));
    }
    let var_count = LittleEndian::read_u16(&bytes[bytes.len() - 2..]) as usize;
    let offsets_start = bytes.len() - 2 - (var_count + 1) * 2;
    if bytes.len() < 2 + (var_count + 1) * 2 {
        return Err(JetError::CorruptedFormat("row truncated before offset table".into()));
    }
    let mut offsets = Vec::with_capacity(var_count + 1);
    for i in 0..=var_count {
        let pos = offsets_start + i * 2;
        offsets.push(LittleEndian::read_u16(&bytes[pos..pos + 2]) as usize);
    }
    offsets.reverse();

    let fixed_width_total: usize = columns
        .iter()
        .filter(|c| !c.is_variable() && c.data_type != DataType::Boolean)
        .map(|c| c.data_type.fixed_width().unwrap_or(0))
        .sum();
    let bitmap_len = columns.len().div_ceil(8);
    let fixed_start = 2;
    let bitmap_start = fixed_start + fixed_width_total;
    let var_blob_start = bitmap_start + bitmap_len;
    if offsets_start < var_blob_start {
        return Err(JetError::CorruptedFormat("row offset table overlaps value region".into()));
    }

    let null_bitmap = &bytes[bitmap_start..bitmap_start + bitmap_len];
    let var_blob = &bytes[var_blob_start..offsets_start];

    let mut values = Vec::with_capacity(columns.len());
    let mut fixed_cursor = fixed_start;
    let mut var_idx = 0usize;
    for (i, col) in columns.iter().enumerate() {
        let bit_set = null_bitmap[i / 8] & (1 << (i % 8)) != 0;

        if col.data_type == DataType::Boolean {
            values.push(Value::Boolean(!bit_set));
            continue;
        }

        if col.is_variable() {
            if bit_set {
                var_idx += 1;
                values.push(Value::Null);
                continue;
            }
            let start = offsets[var_idx];
            let end = offsets[var_idx + 1];
            var_idx += 1;
            if end < start || end > var_blob.len() {
                return Err(JetError::CorruptedFormat("variable-length offset out of range".into()));
            }
            values.push(value::decode(&var_blob[start..end], col.data_type)?);
        } else {
            let width = col.data_type.fixed_width().unwrap_or(0);
            if bit_set {
                fixed_cursor += width;
                values.push(Value::Null);
                continue;
            }
            let slice = &bytes[fixed_cursor..fixed_cursor + width];
            fixed_cursor += width;
            values.push(value::decode(slice, col.data_type)?);
        }
    }

    Ok(values)
}

/// One long-value cell's physical disposition.
#[derive(Debug, Clone, PartialEq)]
pub enum LongValuePointer {
    /// Payload stored directly.
    Inline(Vec<u8>),
    /// Payload stored entirely on one long-value page.
    SinglePage { length: u32, page_no: u32, row_no: u16 },
    /// Payload spans multiple pages via an indirection page of row pointers.
    MultiPage { indirection_page_no: u32 },
}

impl LongValuePointer {
    /// Parse a long-value cell's on-disk bytes (the row byte carries
    /// [`ROW_FLAG_OVERFLOW`] to signal this form is in play).
    pub fn parse(bytes: &[u8]) -> Result<Self, JetError> {
        if bytes.is_empty() {
            return Ok(LongValuePointer::Inline(Vec::new()));
        }
        match bytes[0] {
            LONG_VALUE_TYPE_SINGLE_PAGE => {
                if bytes.len() < 11 {
                    return Err(JetError::CorruptedFormat("single-page long-value pointer too short".into()));
                }
                Ok(LongValuePointer::SinglePage {
                    length: LittleEndian::read_u32(&bytes[1..5]),
                    page_no: LittleEndian::read_u32(&bytes[5..9]),
                    row_no: LittleEndian::read_u16(&bytes[9..11]),
                })
            }
            LONG_VALUE_TYPE_MULTI_PAGE => {
                if bytes.len() < 5 {
                    return Err(JetError::CorruptedFormat("multi-page long-value pointer too short".into()));
                }
                Ok(LongValuePointer::MultiPage {
                    indirection_page_no: LittleEndian::read_u32(&bytes[1..5]),
                })
            }
            _ => Ok(LongValuePointer::Inline(bytes.to_vec())),
        }
    }

    /// Serialize back to on-disk bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            LongValuePointer::Inline(bytes) => bytes.clone(),
            LongValuePointer::SinglePage { length, page_no, row_no } => {
                let mut out = vec![LONG_VALUE_TYPE_SINGLE_PAGE];
                out.extend_from_slice(&length.to_le_bytes());
                out.extend_from_slice(&page_no.to_le_bytes());
                out.extend_from_slice(&row_no.to_le_bytes());
                out
            }
            LongValuePointer::MultiPage { indirection_page_no } => {
                let mut out = vec![LONG_VALUE_TYPE_MULTI_PAGE];
                out.extend_from_slice(&indirection_page_no.to_le_bytes());
                out
            }
        }
    }
}

/// A row-directory entry: byte offset into the page plus deleted/overflow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDirectoryEntry {
    pub offset: u16,
    pub deleted: bool,
    pub overflow: bool,
}

impl RowDirectoryEntry {
    fn parse(raw: u16) -> Self {
        RowDirectoryEntry {
            offset: raw & ROW_OFFSET_MASK,
            deleted: raw & ROW_FLAG_DELETED != 0,
            overflow: raw & ROW_FLAG_OVERFLOW != 0,
        }
    }

    fn to_raw(self) -> u16 {
        let mut raw = self.offset & ROW_OFFSET_MASK;
        if self.deleted {
            raw |= ROW_FLAG_DELETED;
        }
        if self.overflow {
            raw |= ROW_FLAG_OVERFLOW;
        }
        raw
    }
}

/// A data page's row directory and row bytes, operating over an owned page
/// buffer sized to the format's page size.
pub struct DataPage {
    pub buf: Vec<u8>,
}

impl DataPage {
    /// Wrap an existing page buffer (as returned by
    /// [`crate::jet::channel::PageChannel::read_page`]).
    pub fn from_buffer(buf: Vec<u8>) -> Self {
        DataPage { buf }
    }

    /// Initialize a freshly allocated page as an empty data page.
    pub fn new_empty(page_size: usize, owning_tdef_page: u32) -> Self {
        let mut buf = vec![0u8; page_size];
        buf[PAGE_TYPE_OFFSET] = PAGE_TYPE_DATA;
        LittleEndian::write_u32(&mut buf[DATA_PAGE_TDEF_PTR_OFFSET..], owning_tdef_page);
        LittleEndian::write_u16(
            &mut buf[DATA_PAGE_FREE_SPACE_OFFSET..],
            (page_size - DATA_PAGE_HEADER_LEN) as u16,
        );
        DataPage { buf }
    }

    pub fn row_count(&self) -> u16 {
        LittleEndian::read_u16(&self.buf[DATA_PAGE_ROW_COUNT_OFFSET..])
    }

    fn set_row_count(&mut self, count: u16) {
        LittleEndian::write_u16(&mut self.buf[DATA_PAGE_ROW_COUNT_OFFSET..], count);
    }

    fn directory_slot_offset(&self, row_number: u16) -> usize {
        self.buf.len() - 2 * (row_number as usize + 1)
    }

    pub fn directory_entry(&self, row_number: u16) -> Option<RowDirectoryEntry> {
        if row_number >= self.row_count() {
            return None;
        }
        let slot = self.directory_slot_offset(row_number);
        let raw = LittleEndian::read_u16(&self.buf[slot..slot + 2]);
        Some(RowDirectoryEntry::parse(raw))
    }

    fn set_directory_entry(&mut self, row_number: u16, entry: RowDirectoryEntry) {
        let slot = self.directory_slot_offset(row_number);
        LittleEndian::write_u16(&mut self.buf[slot..slot + 2], entry.to_raw());
    }

    /// Raw bytes for one row, not following overflow pointers. Returns
    /// `None` for a tombstoned slot.
    pub fn row_bytes(&self, row_number: u16) -> Option<&[u8]> {
        let entry = self.directory_entry(row_number)?;
        if entry.deleted {
            return None;
        }
        let start = entry.offset as usize;
        // The row's end is the start of the previous row (rows are packed
        // forward in insertion order; the next lower-numbered row with a
        // smaller offset is unrelated) — practically, row length is
        // recovered from the next directory slot's offset, or the current
        // free-space pointer if this is the most recently appended row.
        let mut end_candidates: Vec<usize> = (0..self.row_count())
            .filter_map(|r| self.directory_entry(r))
            .map(|e| e.offset as usize)
            .filter(|&o| o > start)
            .collect();
        end_candidates.sort_unstable();
        let end = end_candidates.first().copied().unwrap_or(self.buf.len() - self.row_count() as usize * 2);
        Some(&self.buf[start..end])
    }

    /// Free space remaining for new row bytes plus one directory slot.
    pub fn free_space(&self) -> u16 {
        LittleEndian::read_u16(&self.buf[DATA_PAGE_FREE_SPACE_OFFSET..])
    }

    /// Append a new row's bytes and directory entry. Fails with
    /// [`JetError::CorruptedFormat`] if the page lacks space; callers are
    /// expected to have already consulted the free-space usage map.
    pub fn append_row(&mut self, row_bytes: &[u8]) -> Result<u16, JetError> {
        let needed = row_bytes.len() + 2;
        if needed > self.free_space() as usize {
            return Err(JetError::CorruptedFormat(
                "data page has insufficient free space for row".into(),
            ));
        }
        let row_count = self.row_count();
        // Rows are packed contiguously forward from the header, so the next
        // row's offset is recovered from free-space bookkeeping: bytes used
        // so far minus the 2-byte directory slot each existing row already
        // claimed.
        let occupied = (self.buf.len() - DATA_PAGE_HEADER_LEN) - self.free_space() as usize;
        let offset = DATA_PAGE_HEADER_LEN + occupied - 2 * row_count as usize;

        self.buf[offset..offset + row_bytes.len()].copy_from_slice(row_bytes);
        self.set_directory_entry(
            row_count,
            RowDirectoryEntry { offset: offset as u16, deleted: false, overflow: false },
        );
        self.set_row_count(row_count + 1);
        LittleEndian::write_u16(
            &mut self.buf[DATA_PAGE_FREE_SPACE_OFFSET..],
            self.free_space() - needed as u16,
        );
        Ok(row_count)
    }

    /// Tombstone a row: mark its directory entry deleted without reclaiming
    /// its bytes (reclamation happens on compaction, not here).
    pub fn delete_row(&mut self, row_number: u16) -> Result<(), JetError> {
        let mut entry = self
            .directory_entry(row_number)
            .ok_or_else(|| JetError::NotFound(format!("row {row_number}")))?;
        entry.deleted = true;
        self.set_directory_entry(row_number, entry);
        Ok(())
    }

    /// Attempt to replace a row's bytes in place, preserving its row number.
    /// Returns `Ok(false)` rather than failing outright if a growing row's
    /// size delta exceeds the page's remaining free space, so callers can
    /// fall back to tombstone-and-reappend. Rows packed after this one (by
    /// byte offset, not row number) shift by the delta to keep the packed
    /// region contiguous.
    pub fn try_overwrite_row(&mut self, row_number: u16, new_bytes: &[u8]) -> Result<bool, JetError> {
        let entry = self
            .directory_entry(row_number)
            .ok_or_else(|| JetError::NotFound(format!("row {row_number}")))?;
        if entry.deleted {
            return Err(JetError::NotFound(format!("row {row_number} is deleted")));
        }
        let old_start = entry.offset as usize;
        let old_len = self.row_bytes(row_number).map(|b| b.len()).unwrap_or(0);
        let delta = new_bytes.len() as isize - old_len as isize;
        if delta > 0 && delta as usize > self.free_space() as usize {
            return Ok(false);
        }

        let row_count = self.row_count();
        let packed_end = self.buf.len() - 2 * row_count as usize - self.free_space() as usize;
        let old_tail_start = old_start + old_len;
        let tail: Vec<u8> = self.buf[old_tail_start..packed_end].to_vec();

        self.buf[old_start..old_start + new_bytes.len()].copy_from_slice(new_bytes);
        let new_tail_start = old_start + new_bytes.len();
        self.buf[new_tail_start..new_tail_start + tail.len()].copy_from_slice(&tail);
        if delta < 0 {
            let vacated_start = new_tail_start + tail.len();
            for b in &mut self.buf[vacated_start..packed_end] {
                *b = 0;
            }
        }

        for r in 0..row_count {
            if r == row_number {
                continue;
            }
            if let Some(mut e) = self.directory_entry(r) {
                if e.offset as usize > old_start {
                    e.offset = (e.offset as isize + delta) as u16;
                    self.set_directory_entry(r, e);
                }
            }
        }
        self.set_directory_entry(row_number, RowDirectoryEntry { offset: old_start as u16, deleted: false, overflow: entry.overflow });
        let new_free = (self.free_space() as isize - delta) as u16;
        LittleEndian::write_u16(&mut self.buf[DATA_PAGE_FREE_SPACE_OFFSET..], new_free);
        Ok(true)
    }
}

/// Read cursor cache over a data page, optionally following an overflow
/// pointer to a secondary page for values that spilled.
pub struct RowState {
    pub page: Option<DataPage>,
    pub page_number: Option<u32>,
    pub row_number: Option<u16>,
    pub deleted: bool,
    pub generation: u64,
}

impl Default for RowState {
    fn default() -> Self {
        RowState { page: None, page_number: None, row_number: None, deleted: false, generation: 0 }
    }
}

impl RowState {
    /// Position the cache at a row's directory entry, loading its page if
    /// necessary.
    pub fn position_at_row_header(
        &mut self,
        row_id: RowId,
        load_page: impl FnOnce(u32) -> Result<DataPage, JetError>,
    ) -> Result<(), JetError> {
        if self.page_number != Some(row_id.page_number) {
            self.page = Some(load_page(row_id.page_number)?);
            self.page_number = Some(row_id.page_number);
        }
        self.row_number = Some(row_id.row_number);
        let entry = self
            .page
            .as_ref()
            .and_then(|p| p.directory_entry(row_id.row_number));
        self.deleted = entry.map(|e| e.deleted).unwrap_or(true);
        self.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_col(ordinal: usize) -> ColumnLayout {
        ColumnLayout { ordinal, data_type: DataType::Text, length: 255, compressed_unicode: true }
    }

    fn long_col(ordinal: usize) -> ColumnLayout {
        ColumnLayout { ordinal, data_type: DataType::Long, length: 4, compressed_unicode: false }
    }

    fn bool_col(ordinal: usize) -> ColumnLayout {
        ColumnLayout { ordinal, data_type: DataType::Boolean, length: 0, compressed_unicode: false }
    }

    #[test]
    fn pack_unpack_round_trips_mixed_row() {
        let columns = vec![text_col(0), long_col(1), bool_col(2)];
        let values = vec![Value::Text("Tim".into()), Value::Long(999), Value::Boolean(true)];
        let bytes = pack_row(&columns, &values).unwrap();
        let decoded = unpack_row(&bytes, &columns).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn pack_unpack_handles_nulls() {
        let columns = vec![text_col(0), long_col(1)];
        let values = vec![Value::Null, Value::Long(5)];
        let bytes = pack_row(&columns, &values).unwrap();
        let decoded = unpack_row(&bytes, &columns).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn boolean_false_is_bit_set() {
        let columns = vec![bool_col(0)];
        let bytes = pack_row(&columns, &[Value::Boolean(false)]).unwrap();
        let decoded = unpack_row(&bytes, &columns).unwrap();
        assert_eq!(decoded, vec![Value::Boolean(false)]);
    }

    #[test]
    fn data_page_append_and_read_row() {
        let mut page = DataPage::new_empty(4096, 10);
        let row = pack_row(&[long_col(0)], &[Value::Long(42)]).unwrap();
        let row_no = page.append_row(&row).unwrap();
        assert_eq!(row_no, 0);
        assert_eq!(page.row_count(), 1);
        let read_back = page.row_bytes(0).unwrap();
        assert_eq!(unpack_row(read_back, &[long_col(0)]).unwrap(), vec![Value::Long(42)]);
    }

    #[test]
    fn delete_row_tombstones_without_removing_bytes() {
        let mut page = DataPage::new_empty(4096, 10);
        let row = pack_row(&[long_col(0)], &[Value::Long(1)]).unwrap();
        page.append_row(&row).unwrap();
        page.delete_row(0).unwrap();
        assert!(page.row_bytes(0).is_none());
        assert!(page.directory_entry(0).unwrap().deleted);
    }

    #[test]
    fn long_value_pointer_round_trips_each_variant() {
        for ptr in [
            LongValuePointer::Inline(vec![1, 2, 3]),
            LongValuePointer::SinglePage { length: 10, page_no: 7, row_no: 2 },
            LongValuePointer::MultiPage { indirection_page_no: 99 },
        ] {
            let bytes = ptr.to_bytes();
            assert_eq!(LongValuePointer::parse(&bytes).unwrap(), ptr);
        }
    }

    #[test]
    fn try_overwrite_row_shrinks_in_place_and_shifts_later_rows() {
        let mut page = DataPage::new_empty(4096, 10);
        let row0 = pack_row(&[long_col(0)], &[Value::Long(1)]).unwrap();
        let row1 = pack_row(&[text_col(0)], &[Value::Text("hello world".into())]).unwrap();
        page.append_row(&row0).unwrap();
        page.append_row(&row1).unwrap();

        let shrunk = pack_row(&[long_col(0)], &[Value::Long(2)]).unwrap();
        let ok = page.try_overwrite_row(0, &shrunk).unwrap();
        assert!(ok);
        assert_eq!(unpack_row(page.row_bytes(0).unwrap(), &[long_col(0)]).unwrap(), vec![Value::Long(2)]);
        assert_eq!(
            unpack_row(page.row_bytes(1).unwrap(), &[text_col(0)]).unwrap(),
            vec![Value::Text("hello world".into())]
        );
    }

    #[test]
    fn try_overwrite_row_grows_in_place_when_space_allows() {
        let mut page = DataPage::new_empty(4096, 10);
        let row0 = pack_row(&[text_col(0)], &[Value::Text("ab".into())]).unwrap();
        page.append_row(&row0).unwrap();

        let grown = pack_row(&[text_col(0)], &[Value::Text("a much longer value than before".into())]).unwrap();
        let ok = page.try_overwrite_row(0, &grown).unwrap();
        assert!(ok);
        assert_eq!(
            unpack_row(page.row_bytes(0).unwrap(), &[text_col(0)]).unwrap(),
            vec![Value::Text("a much longer value than before".into())]
        );
    }

    #[test]
    fn row_id_total_order() {
        assert!(FIRST_ROW_ID < RowId::new(0, 0) || FIRST_ROW_ID == RowId::new(0, 0));
        assert!(RowId::new(1, 0) < RowId::new(1, 1));
        assert!(RowId::new(1, 5) < RowId::new(2, 0));
        assert!(RowId::new(2, 0) < LAST_ROW_ID);
    }
}
