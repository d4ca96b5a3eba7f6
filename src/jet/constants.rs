//! Jet page and file structure constants.
//!
//! Offsets mirror the well-known layout of the Jet database header page and
//! data page row directory, as documented across the open-source Jet-format
//! readers (mdbtools, Jackcess). Every multi-byte field is little-endian.

// ── Page sizes ──────────────────────────────────────────────────────

/// Page size used by the oldest supported format (Jet 3 / `.mdb`, Access 97).
pub const SIZE_PAGE_V3: u32 = 2048;
/// Page size used by Jet 4 and all later formats.
pub const SIZE_PAGE_MODERN: u32 = 4096;

// ── Header page (page 0) ───────────────────────────────────────────

/// Size of the fixed engine-signature prefix at the start of page 0.
pub const HEADER_SIGNATURE_LEN: usize = 4;
/// Expected bytes of the engine-signature prefix (common to the whole family).
pub const HEADER_SIGNATURE: [u8; HEADER_SIGNATURE_LEN] = [0x00, 0x01, 0x00, 0x00];
/// Offset of the single-byte format version code.
pub const HEADER_VERSION_OFFSET: usize = 0x14;
/// Offset of the database-level password/mask area (start of the masked region).
pub const HEADER_MASK_OFFSET: usize = 0x18;
/// Length of the masked region on page 0.
pub const HEADER_MASK_LEN: usize = 0x1F8;
/// Offset of the default codepage/charset identifier.
pub const HEADER_CHARSET_OFFSET: usize = 0x3C;
/// Offset of the row id of the catalog's root "MSysObjects"-equivalent table.
pub const HEADER_CATALOG_ROOT_OFFSET: usize = 0x4A;

// ── Format version codes (byte at HEADER_VERSION_OFFSET) ──────────

/// Version code for the oldest supported format (page size 2048).
pub const VERSION_CODE_V3: u8 = 0x00;
/// Version code for the Jet 4 format (page size 4096, no encryption).
pub const VERSION_CODE_V4: u8 = 0x01;
/// Version code for the ACE/accdb format (page size 4096, AES encryption).
pub const VERSION_CODE_V5: u8 = 0x02;

// ── Page types (first byte of every page) ──────────────────────────

/// Page type byte: database definition / header page.
pub const PAGE_TYPE_HEADER: u8 = 0x00;
/// Page type byte: table definition page.
pub const PAGE_TYPE_TABLE_DEF: u8 = 0x02;
/// Page type byte: data page.
pub const PAGE_TYPE_DATA: u8 = 0x01;
/// Page type byte: index (node or leaf) page.
pub const PAGE_TYPE_INDEX: u8 = 0x03;
/// Page type byte: usage-map page.
pub const PAGE_TYPE_USAGE_MAP: u8 = 0x04;
/// Page type byte: long-value (overflow) page.
pub const PAGE_TYPE_LONG_VALUE: u8 = 0x05;
/// Page number / row number marking an invalid or deallocated page slot.
pub const INVALID_PAGE_MARKER: u32 = 0xFFFF_FFFF;

// ── Data page header ─────────────────────────────────────────────

/// Offset of the page type byte.
pub const PAGE_TYPE_OFFSET: usize = 0x00;
/// Offset of the free-space-remaining field (2 bytes) on a data page.
pub const DATA_PAGE_FREE_SPACE_OFFSET: usize = 0x02;
/// Offset of the owning table-definition page pointer (4 bytes).
pub const DATA_PAGE_TDEF_PTR_OFFSET: usize = 0x04;
/// Offset of the row count (2 bytes) on a data page.
pub const DATA_PAGE_ROW_COUNT_OFFSET: usize = 0x08;
/// Start of the per-row directory, growing backward from the end of the page.
/// Each entry is a 2-byte offset; the high 2 bits carry row flags.
pub const DATA_PAGE_HEADER_LEN: usize = 0x0A;

/// Row directory entry flag bit: row is deleted (tombstoned).
pub const ROW_FLAG_DELETED: u16 = 0x8000;
/// Row directory entry flag bit: row value is an overflow/long-value pointer.
pub const ROW_FLAG_OVERFLOW: u16 = 0x4000;
/// Mask isolating the actual byte offset from a row directory entry.
pub const ROW_OFFSET_MASK: u16 = 0x3FFF;

// ── Long value pointer flags ────────────────────────────────────────

/// Long-value pointer type: payload stored in full on a single page.
pub const LONG_VALUE_TYPE_SINGLE_PAGE: u8 = 0x80;
/// Long-value pointer type: payload spans multiple pages via an indirection page.
pub const LONG_VALUE_TYPE_MULTI_PAGE: u8 = 0x40;

// ── Index page header ────────────────────────────────────────────

/// Offset of the number of used bytes / entries summary (implementation-defined use).
pub const INDEX_PAGE_FREE_SPACE_OFFSET: usize = 0x02;
/// Offset of the owning table-definition page pointer.
pub const INDEX_PAGE_TDEF_PTR_OFFSET: usize = 0x04;
/// Offset of the previous sibling page number.
pub const INDEX_PAGE_PREV_OFFSET: usize = 0x08;
/// Offset of the next sibling page number.
pub const INDEX_PAGE_NEXT_OFFSET: usize = 0x0C;
/// Offset of the child leaf/tail page number (node pages only; unused on leaves).
pub const INDEX_PAGE_CHILD_TAIL_OFFSET: usize = 0x10;
/// Offset of the entry count (2 bytes).
pub const INDEX_PAGE_ENTRY_COUNT_OFFSET: usize = 0x14;
/// Start of index entry data.
pub const INDEX_PAGE_HEADER_LEN: usize = 0x16;

/// Single NULL-sorting byte for an index key component.
pub const INDEX_KEY_NULL_BYTE: u8 = 0x00;
/// Ascending-column key terminator byte.
pub const INDEX_KEY_ASC_TERMINATOR: u8 = 0x01;

// ── Auto-number sentinels ───────────────────────────────────────────

/// Smallest legal explicit long auto-number value.
pub const MIN_AUTO_NUMBER: i32 = 1;
