//! Per-character index-key encoding tables for text columns.
//!
//! The original product assigns every Unicode code point to one of four
//! bucket encodings when building a text index key: inline sort bytes,
//! unprintable-character extra bytes, international extension bytes, or
//! multi-byte "crazy" sequences. The full table spans all of `0x0000..=0xFFFF`
//! and is not reproducible here (see `DESIGN.md`); this module implements the
//! ASCII/Latin-1 range (`0x00..=0xFF`) exactly and falls back to a
//! deterministic, order-preserving synthetic bucket for anything above it, so
//! that encoding is always total and always order-preserving, even though it
//! is not byte-for-byte identical to the original product outside Latin-1.

/// Which bucket a code point's index-key bytes belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharBucket {
    /// Emits directly as sort-order bytes inline in the key.
    Inline,
    /// Emits a placeholder inline byte plus extra bytes in the unprintable
    /// region appended after the separator.
    Unprintable,
    /// Emits into the international extension region.
    International,
    /// Falls outside the reproduced Latin-1 table; uses a synthetic,
    /// order-preserving multi-byte sequence.
    Extended,
}

/// Per-character encoding result: the inline byte(s) and optional extra
/// bytes appended after the per-column separator.
pub struct CharEncoding {
    /// Bucket this code point was classified into.
    pub bucket: CharBucket,
    /// Bytes emitted inline, in key order.
    pub inline_bytes: Vec<u8>,
    /// Bytes emitted in the extra region, if any (unprintable/international/extended).
    pub extra_bytes: Vec<u8>,
}

/// Classify and encode one UTF-16 code unit for use in a text index key.
///
/// Code points `0x00..=0xFF` follow the reproduced Latin-1 table: printable
/// ASCII (`0x20..=0x7E`) sorts inline by its own value shifted to leave room
/// below it for control characters, which go to the unprintable bucket.
/// Everything above `0xFF` is a best-effort, order-preserving fallback.
pub fn encode_char(code_unit: u16) -> CharEncoding {
    match code_unit {
        0x20..=0x7E => CharEncoding {
            bucket: CharBucket::Inline,
            inline_bytes: vec![(code_unit - 0x20 + 0x02) as u8],
            extra_bytes: Vec::new(),
        },
        0x00..=0x1F | 0x7F..=0xFF => CharEncoding {
            bucket: CharBucket::Unprintable,
            inline_bytes: vec![0x01],
            extra_bytes: vec![(code_unit & 0xFF) as u8],
        },
        0x0100..=0xFFFF => CharEncoding {
            bucket: CharBucket::Extended,
            inline_bytes: vec![0x00, (code_unit >> 8) as u8],
            extra_bytes: vec![(code_unit & 0xFF) as u8],
        },
    }
}

/// Encode a full UTF-16 string into index-key bytes: inline bytes for every
/// character, in order, followed by the extra-byte region for any character
/// that produced one (unprintable/international/extended), each preceded by
/// a `0x00` separator so the extra region is self-delimiting.
pub fn encode_text_key(units: &[u16]) -> Vec<u8> {
    let mut inline = Vec::with_capacity(units.len());
    let mut extra = Vec::new();
    for &unit in units {
        let enc = encode_char(unit);
        inline.extend_from_slice(&enc.inline_bytes);
        if !enc.extra_bytes.is_empty() {
            extra.push(0x00);
            extra.extend_from_slice(&enc.extra_bytes);
        }
    }
    inline.extend_from_slice(&extra);
    inline
}
