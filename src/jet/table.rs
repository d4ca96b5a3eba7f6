//! Table metadata and row-level CRUD.
//!
//! A [`Table`] owns its column schema, its data pages, and its indexes
//! (including at most one primary key). All row mutation funnels through
//! here so that index maintenance, auto-number assignment, and referential
//! integrity checks happen in one place. Mirroring [`crate::jet::index::IndexData`],
//! a table's data pages are held as an in-memory, bulk-rebuildable vector
//! rather than wired to a live page channel cursor-by-cursor; `database.rs`
//! is responsible for loading that vector from disk and persisting it back.
//!
//! `Memo`/`Ole` cells above [`LONG_VALUE_INLINE_THRESHOLD`] spill to their
//! own long-value pages rather than inflating a data page; see
//! `resolve_long_values_for_write`/`resolve_long_values_for_read`.

use byteorder::{ByteOrder, LittleEndian};
use rand::RngCore;

use crate::jet::constants::{DATA_PAGE_HEADER_LEN, LONG_VALUE_TYPE_MULTI_PAGE, LONG_VALUE_TYPE_SINGLE_PAGE};
use crate::jet::index::{IndexColumn, IndexData};
use crate::jet::row::{pack_row, unpack_row, ColumnLayout, DataPage, LongValuePointer, RowId, RowValues};
use crate::jet::usage_map::UsageMap;
use crate::jet::value::{DataType, Value};
use crate::JetError;

/// Cells larger than this spill out of the row into their own long-value
/// page(s) rather than inflating the data page; only `Memo`/`Ole` cells are
/// eligible. Chosen well under a page's usable capacity so a handful of
/// ordinary rows still fit alongside a spilled cell's pointer.
const LONG_VALUE_INLINE_THRESHOLD: usize = 1024;

/// Long-value page numbers live in a disjoint range from data-page numbers
/// (which start at 1 and grow from `Database::alloc_root_page`), so the two
/// address spaces never collide.
const LONG_VALUE_PAGE_BASE: u32 = 0x4000_0000;

/// A column's full schema: physical layout plus name and behavioral flags.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ordinal: usize,
    pub data_type: DataType,
    pub length: usize,
    pub nullable: bool,
    /// `Long` columns sequence from 1; `Guid` columns get a fresh random
    /// value on insert. Other data types cannot be auto-number columns.
    pub auto_number: bool,
    /// Whether a `Text` column may use the compressed-ASCII encoding when
    /// every character fits in a byte. Some columns are created with
    /// compression disabled and must always store raw UCS-2. Ignored for
    /// non-`Text` columns.
    pub compressed_unicode: bool,
}

impl Column {
    pub fn to_layout(&self) -> ColumnLayout {
        ColumnLayout {
            ordinal: self.ordinal,
            data_type: self.data_type,
            length: self.length,
            compressed_unicode: self.compressed_unicode,
        }
    }
}

/// A foreign key from this table's `local_columns` to another table's
/// `referenced_columns`. Cross-table enforcement is driven by `database.rs`,
/// which owns every table and can look up the referenced one; this
/// descriptor just records the relationship.
#[derive(Debug, Clone)]
pub struct ForeignKeyRef {
    pub name: String,
    pub local_columns: Vec<usize>,
    pub referenced_table: String,
    pub referenced_columns: Vec<usize>,
    pub cascade_delete: bool,
}

/// A table's schema, data, and indexes.
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<IndexData>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub root_page: u32,
    data_pages: Vec<DataPage>,
    /// Pages holding spilled `Memo`/`Ole` content and the indirection pages
    /// that list a multi-page value's chunks, addressed via
    /// `LONG_VALUE_PAGE_BASE`-relative page numbers (see `store_long_value`).
    long_value_pages: Vec<DataPage>,
    /// Every data page this table currently owns, by page number.
    owned_pages: UsageMap,
    /// Subset of `owned_pages` with room for at least one more average row;
    /// `append_row_bytes` consults this before falling back to a brand-new
    /// page. Tracked as a genuine usage map (not just derived on the fly)
    /// so it exercises the same inline/reference promotion a real table's
    /// free-space map would.
    free_space_pages: UsageMap,
    page_size: usize,
    next_long_auto_number: i32,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, root_page: u32, page_size: usize) -> Self {
        let mut owned_pages = UsageMap::new_inline(root_page);
        owned_pages.add(root_page);
        let mut free_space_pages = UsageMap::new_inline(root_page);
        free_space_pages.add(root_page);
        Table {
            name: name.into(),
            columns,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            root_page,
            data_pages: vec![DataPage::new_empty(page_size, root_page)],
            long_value_pages: Vec::new(),
            owned_pages,
            free_space_pages,
            page_size,
            next_long_auto_number: 1,
        }
    }

    /// Pages this table currently owns, used for storage and verification
    /// tooling (`jetutil validate`) rather than row access itself.
    pub fn owned_pages(&self) -> &UsageMap {
        &self.owned_pages
    }

    /// Pages with room for at least one more average-sized row.
    pub fn free_space_pages(&self) -> &UsageMap {
        &self.free_space_pages
    }

    fn layouts(&self) -> Vec<ColumnLayout> {
        self.columns.iter().map(Column::to_layout).collect()
    }

    /// Add a primary-key or secondary index over the given columns.
    /// `ignore_nulls` exempts any key containing a NULL component from the
    /// uniqueness check and from the index's entry count.
    pub fn add_index(&mut self, columns: Vec<IndexColumn>, unique: bool, primary: bool, ignore_nulls: bool, root_page: u32) {
        self.indexes.push(IndexData::new(root_page, columns, unique, primary, ignore_nulls));
    }

    /// Assign auto-number columns, validate column count/types, enforce
    /// unique/primary-key indexes, append the row, and update every index.
    /// On any index violation the row is not appended.
    ///
    /// An auto-number column's value is resolved per `allow_auto_number_insert`:
    /// with it disabled (the default), any value the caller passed is
    /// discarded and the next number is generated, matching the original
    /// product's behavior of refusing to let a user type into an
    /// auto-number field at all. With it enabled, an explicit non-null
    /// value is validated and stored as given, and a `Long` auto-number's
    /// counter ratchets forward to stay ahead of it (never backward).
    pub fn add_row(&mut self, mut values: RowValues, allow_auto_number_insert: bool) -> Result<RowId, JetError> {
        if values.len() != self.columns.len() {
            return Err(JetError::InvalidArgument(format!(
                "table {} expects {} columns, got {}",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }

        for i in 0..self.columns.len() {
            let auto_number = self.columns[i].auto_number;
            let nullable = self.columns[i].nullable;
            let data_type = self.columns[i].data_type;
            let name = self.columns[i].name.clone();

            if auto_number {
                let explicit_is_null = matches!(values[i], Value::Null);
                if explicit_is_null || !allow_auto_number_insert {
                    values[i] = self.generate_auto_number(data_type, &name)?;
                } else {
                    self.validate_and_ratchet_auto_number(data_type, &name, &values[i])?;
                }
                continue;
            }
            if !nullable && matches!(values[i], Value::Null) {
                return Err(JetError::ValueOutOfRange(format!("column {name} does not accept NULL")));
            }
        }

        // Dry-run uniqueness checks before mutating anything, so a
        // violation leaves the table and all indexes untouched.
        for index in &self.indexes {
            if index.unique && !index.should_skip_for_nulls(&values) {
                let key = crate::jet::index::encode_entry_key(&values, &index.columns)?;
                if index.find_first(&key).map(|(k, _)| k == key.as_slice()).unwrap_or(false) {
                    return Err(JetError::UniquenessViolation(format!(
                        "duplicate key inserting into {}",
                        self.name
                    )));
                }
            }
        }

        self.resolve_long_values_for_write(&mut values)?;
        let row_bytes = pack_row(&self.layouts(), &values)?;
        let row_id = self.append_row_bytes(&row_bytes)?;

        for index in &mut self.indexes {
            index.insert(&values, row_id)?;
        }

        Ok(row_id)
    }

    fn generate_auto_number(&mut self, data_type: DataType, name: &str) -> Result<Value, JetError> {
        match data_type {
            DataType::Long => {
                let v = self.next_long_auto_number;
                self.next_long_auto_number += 1;
                Ok(Value::Long(v))
            }
            DataType::Guid => {
                let mut bytes = [0u8; 16];
                rand::rng().fill_bytes(&mut bytes);
                Ok(Value::Guid(format_guid(&bytes)))
            }
            other => Err(JetError::UnsupportedFormat(format!(
                "column {name} of type {other:?} cannot be an auto-number column"
            ))),
        }
    }

    /// Validate an explicit auto-number value supplied under
    /// `allow_auto_number_insert` and, for `Long`, ratchet the counter
    /// forward so the next generated value stays ahead of it.
    fn validate_and_ratchet_auto_number(&mut self, data_type: DataType, name: &str, value: &Value) -> Result<(), JetError> {
        match (data_type, value) {
            (DataType::Long, Value::Long(v)) => {
                if *v <= 0 {
                    return Err(JetError::ValueOutOfRange(format!(
                        "auto-number column {name} requires a positive value, got {v}"
                    )));
                }
                self.next_long_auto_number = self.next_long_auto_number.max(*v + 1);
                Ok(())
            }
            (DataType::Guid, Value::Guid(_)) => Ok(()),
            _ => Err(JetError::ValueOutOfRange(format!(
                "explicit value for auto-number column {name} has the wrong type"
            ))),
        }
    }

    /// Append a row to the first page `free_space_pages` offers that actually
    /// has room (a stale entry just means that page filled up since it was
    /// added; skip and keep walking), falling back to a brand-new page.
    fn append_row_bytes(&mut self, row_bytes: &[u8]) -> Result<RowId, JetError> {
        let needed = row_bytes.len() + 2;
        let candidates: Vec<u32> = {
            let mut cursor = self.free_space_pages.cursor();
            let mut v = Vec::new();
            while let Some(page_no) = cursor.next() {
                v.push(page_no);
            }
            v
        };
        for page_no in candidates {
            let idx = (page_no - self.root_page) as usize;
            let Some(page) = self.data_pages.get_mut(idx) else { continue };
            if page.free_space() as usize >= needed {
                let row_no = page.append_row(row_bytes)?;
                if (page.free_space() as usize) < needed {
                    self.free_space_pages.remove(page_no);
                }
                return Ok(RowId::new(page_no, row_no));
            }
        }
        let mut page = DataPage::new_empty(self.page_size, self.root_page);
        let row_no = page.append_row(row_bytes)?;
        let page_index = self.data_pages.len() as u32;
        let page_no = self.root_page + page_index;
        self.owned_pages.add(page_no);
        if page.free_space() as usize >= needed {
            self.free_space_pages.add(page_no);
        }
        self.data_pages.push(page);
        Ok(RowId::new(page_no, row_no))
    }

    fn page_for(&self, row_id: RowId) -> Result<&DataPage, JetError> {
        let idx = row_id
            .page_number
            .checked_sub(self.root_page)
            .ok_or_else(|| JetError::NotFound(format!("row {row_id:?} not in table {}", self.name)))? as usize;
        self.data_pages
            .get(idx)
            .ok_or_else(|| JetError::NotFound(format!("row {row_id:?} not in table {}", self.name)))
    }

    fn page_for_mut(&mut self, row_id: RowId) -> Result<&mut DataPage, JetError> {
        let idx = row_id
            .page_number
            .checked_sub(self.root_page)
            .ok_or_else(|| JetError::NotFound(format!("row {row_id:?} not in table", )))? as usize;
        self.data_pages
            .get_mut(idx)
            .ok_or_else(|| JetError::NotFound("row not in table".into()))
    }

    /// Fetch a row's current values, or `None` if deleted/absent.
    pub fn get_row(&self, row_id: RowId) -> Result<Option<RowValues>, JetError> {
        let page = self.page_for(row_id)?;
        match page.row_bytes(row_id.row_number) {
            None => Ok(None),
            Some(bytes) => {
                let mut values = unpack_row(bytes, &self.layouts())?;
                self.resolve_long_values_for_read(&mut values)?;
                Ok(Some(values))
            }
        }
    }

    /// Replace a row's values, removing its old index entries and inserting
    /// new ones. Tries an in-place overwrite first, which preserves the
    /// row's `RowId` regardless of whether the new value is larger or
    /// smaller than the old one; only falls back to tombstone-and-reappend
    /// when the page has no room to absorb a growing row (in which case the
    /// row's identity is not preserved).
    pub fn update_row(&mut self, row_id: RowId, mut new_values: RowValues) -> Result<RowId, JetError> {
        let old_values = self.get_row(row_id)?.ok_or_else(|| JetError::NotFound(format!("{row_id:?}")))?;
        if new_values.len() != self.columns.len() {
            return Err(JetError::InvalidArgument("column count mismatch on update".into()));
        }

        for index in &self.indexes {
            if index.unique && !index.should_skip_for_nulls(&new_values) {
                let key = crate::jet::index::encode_entry_key(&new_values, &index.columns)?;
                let is_same_row = index
                    .find_first(&key)
                    .map(|(k, r)| k == key.as_slice() && r == row_id)
                    .unwrap_or(false);
                let occupied = index.find_first(&key).map(|(k, _)| k == key.as_slice()).unwrap_or(false);
                if occupied && !is_same_row {
                    return Err(JetError::UniquenessViolation("duplicate key on update".into()));
                }
            }
        }

        self.resolve_long_values_for_write(&mut new_values)?;
        let new_bytes = pack_row(&self.layouts(), &new_values)?;

        let overwrote = self.page_for_mut(row_id)?.try_overwrite_row(row_id.row_number, &new_bytes)?;
        let new_row_id = if overwrote {
            let needed = new_bytes.len() + 2;
            let still_has_room = self.page_for(row_id)?.free_space() as usize >= needed;
            if still_has_room {
                self.free_space_pages.add(row_id.page_number);
            } else {
                self.free_space_pages.remove(row_id.page_number);
            }
            row_id
        } else {
            self.page_for_mut(row_id)?.delete_row(row_id.row_number)?;
            self.append_row_bytes(&new_bytes)?
        };

        for index in &mut self.indexes {
            index.remove(&old_values, row_id).ok();
            index.insert(&new_values, new_row_id)?;
        }

        Ok(new_row_id)
    }

    /// Tombstone a row and remove it from every index.
    pub fn delete_row(&mut self, row_id: RowId) -> Result<(), JetError> {
        let values = self.get_row(row_id)?.ok_or_else(|| JetError::NotFound(format!("{row_id:?}")))?;
        self.page_for_mut(row_id)?.delete_row(row_id.row_number)?;
        for index in &mut self.indexes {
            index.remove(&values, row_id).ok();
        }
        Ok(())
    }

    /// All non-deleted `(RowId, values)` pairs in physical storage order —
    /// the backing iterator for a table-scan cursor.
    pub fn scan(&self) -> Vec<(RowId, RowValues)> {
        let mut out = Vec::new();
        for (i, page) in self.data_pages.iter().enumerate() {
            for row_no in 0..page.row_count() {
                if let Some(bytes) = page.row_bytes(row_no) {
                    if let Ok(mut values) = unpack_row(bytes, &self.layouts()) {
                        if self.resolve_long_values_for_read(&mut values).is_ok() {
                            out.push((RowId::new(self.root_page + i as u32, row_no), values));
                        }
                    }
                }
            }
        }
        out
    }

    pub fn row_count(&self) -> usize {
        self.data_pages
            .iter()
            .map(|p| (0..p.row_count()).filter(|&r| p.row_bytes(r).is_some()).count())
            .sum()
    }

    /// Replace any `Memo`/`Ole` cell too large to inline with a
    /// [`LongValuePointer`], spilling its content to a dedicated long-value
    /// page (or a chain of them plus an indirection page, for content too
    /// big for one page).
    fn resolve_long_values_for_write(&mut self, values: &mut RowValues) -> Result<(), JetError> {
        for i in 0..self.columns.len() {
            let data_type = self.columns[i].data_type;
            if !matches!(data_type, DataType::Memo | DataType::Ole) {
                continue;
            }
            let content = match &values[i] {
                Value::Memo(b) | Value::Ole(b) => b.clone(),
                _ => continue,
            };
            if content.len() <= LONG_VALUE_INLINE_THRESHOLD {
                continue;
            }
            let pointer = self.store_long_value(&content)?;
            values[i] = match data_type {
                DataType::Memo => Value::Memo(pointer.to_bytes()),
                DataType::Ole => Value::Ole(pointer.to_bytes()),
                _ => unreachable!(),
            };
        }
        Ok(())
    }

    /// Inverse of [`Table::resolve_long_values_for_write`]: any `Memo`/`Ole`
    /// cell whose bytes look like a long-value pointer (a short byte string
    /// led by the single- or multi-page discriminant) is replaced by its
    /// dereferenced content. A cell that happens to be genuine inline
    /// content of the same shape is the one disclosed ambiguity this scheme
    /// carries; see `DESIGN.md`.
    fn resolve_long_values_for_read(&self, values: &mut RowValues) -> Result<(), JetError> {
        for i in 0..self.columns.len() {
            let data_type = self.columns[i].data_type;
            if !matches!(data_type, DataType::Memo | DataType::Ole) {
                continue;
            }
            let bytes = match &values[i] {
                Value::Memo(b) | Value::Ole(b) => b.clone(),
                _ => continue,
            };
            if bytes.is_empty() || bytes.len() > 11 {
                continue;
            }
            if bytes[0] != LONG_VALUE_TYPE_SINGLE_PAGE && bytes[0] != LONG_VALUE_TYPE_MULTI_PAGE {
                continue;
            }
            let pointer = LongValuePointer::parse(&bytes)?;
            let content = self.load_long_value(&pointer)?;
            values[i] = match data_type {
                DataType::Memo => Value::Memo(content),
                DataType::Ole => Value::Ole(content),
                _ => unreachable!(),
            };
        }
        Ok(())
    }

    /// Store `payload` across one or more long-value pages, chunking and
    /// adding an indirection page if it doesn't fit on a single one.
    fn store_long_value(&mut self, payload: &[u8]) -> Result<LongValuePointer, JetError> {
        let capacity = self.page_size - DATA_PAGE_HEADER_LEN - 4;
        if payload.len() <= capacity {
            let mut page = DataPage::new_empty(self.page_size, self.root_page);
            let row_no = page.append_row(payload)?;
            let page_no = LONG_VALUE_PAGE_BASE + self.long_value_pages.len() as u32;
            self.long_value_pages.push(page);
            return Ok(LongValuePointer::SinglePage { length: payload.len() as u32, page_no, row_no });
        }

        let mut chunk_refs = Vec::new();
        for chunk in payload.chunks(capacity) {
            let mut page = DataPage::new_empty(self.page_size, self.root_page);
            let row_no = page.append_row(chunk)?;
            let page_no = LONG_VALUE_PAGE_BASE + self.long_value_pages.len() as u32;
            self.long_value_pages.push(page);
            chunk_refs.push((page_no, row_no));
        }

        let mut indirection = DataPage::new_empty(self.page_size, self.root_page);
        for (page_no, row_no) in &chunk_refs {
            let mut entry = Vec::with_capacity(6);
            entry.extend_from_slice(&page_no.to_le_bytes());
            entry.extend_from_slice(&row_no.to_le_bytes());
            indirection.append_row(&entry)?;
        }
        let indirection_page_no = LONG_VALUE_PAGE_BASE + self.long_value_pages.len() as u32;
        self.long_value_pages.push(indirection);
        Ok(LongValuePointer::MultiPage { indirection_page_no })
    }

    /// Reassemble a long value from its pointer.
    fn load_long_value(&self, pointer: &LongValuePointer) -> Result<Vec<u8>, JetError> {
        match pointer {
            LongValuePointer::Inline(bytes) => Ok(bytes.clone()),
            LongValuePointer::SinglePage { page_no, row_no, .. } => {
                let page = self.long_value_page(*page_no)?;
                page.row_bytes(*row_no)
                    .map(|b| b.to_vec())
                    .ok_or_else(|| JetError::NotFound("long value row missing".into()))
            }
            LongValuePointer::MultiPage { indirection_page_no } => {
                let indirection = self.long_value_page(*indirection_page_no)?;
                let mut out = Vec::new();
                for row_no in 0..indirection.row_count() {
                    let entry = indirection
                        .row_bytes(row_no)
                        .ok_or_else(|| JetError::CorruptedFormat("long value indirection row missing".into()))?;
                    if entry.len() < 6 {
                        return Err(JetError::CorruptedFormat("long value indirection entry too short".into()));
                    }
                    let chunk_page_no = LittleEndian::read_u32(&entry[0..4]);
                    let chunk_row_no = LittleEndian::read_u16(&entry[4..6]);
                    let page = self.long_value_page(chunk_page_no)?;
                    let chunk = page
                        .row_bytes(chunk_row_no)
                        .ok_or_else(|| JetError::NotFound("long value chunk missing".into()))?;
                    out.extend_from_slice(chunk);
                }
                Ok(out)
            }
        }
    }

    fn long_value_page(&self, page_no: u32) -> Result<&DataPage, JetError> {
        let idx = page_no
            .checked_sub(LONG_VALUE_PAGE_BASE)
            .ok_or_else(|| JetError::NotFound("long value page out of range".into()))? as usize;
        self.long_value_pages.get(idx).ok_or_else(|| JetError::NotFound("long value page not found".into()))
    }
}

fn format_guid(bytes: &[u8; 16]) -> String {
    format!(
        "{{{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}
