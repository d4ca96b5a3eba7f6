//! Sparse page-number bitmaps.
//!
//! A [`UsageMap`] represents "which pages belong to X" — a table's owned
//! data pages, its free-space pages, or the database-wide free-page map.
//! Two on-disk encodings exist: *inline* (bits packed directly in the usage
//! map's own row) and *reference* (bits indirected through a chain of
//! dedicated bitmap pages). Promotion from inline to reference happens when
//! the inline form's fixed capacity is exceeded.

use std::collections::BTreeSet;

/// Capacity, in tracked pages, of the inline encoding before promotion.
pub const INLINE_CAPACITY_BITS: usize = 0x3FD * 8;

/// On-disk encoding discriminant for a usage map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageMapEncoding {
    /// Bits are stored directly in the usage map's row.
    Inline,
    /// Bits are indirected through a chain of dedicated bitmap pages.
    Reference,
}

/// A sparse, ordered set of page numbers with a generation counter for
/// cursor invalidation.
#[derive(Debug, Clone)]
pub struct UsageMap {
    start_page: u32,
    pages: BTreeSet<u32>,
    encoding: UsageMapEncoding,
    generation: u64,
}

impl UsageMap {
    /// Build an empty inline usage map starting at the given page number.
    pub fn new_inline(start_page: u32) -> Self {
        UsageMap {
            start_page,
            pages: BTreeSet::new(),
            encoding: UsageMapEncoding::Inline,
            generation: 0,
        }
    }

    /// Parse a usage map from its on-disk row bytes. The first byte
    /// distinguishes inline (`0x00`) from reference (`0x01`) encoding; the
    /// next four bytes (little-endian) give the starting page number; the
    /// remainder is either a raw bitmap (inline) or a list of bitmap page
    /// numbers (reference, read indirectly by the caller via [`UsageMap::reference_pages`]).
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 5 {
            return None;
        }
        let start_page = u32::from_le_bytes(data[1..5].try_into().ok()?);
        match data[0] {
            0x00 => {
                let mut pages = BTreeSet::new();
                for (byte_idx, byte) in data[5..].iter().enumerate() {
                    for bit in 0..8 {
                        if byte & (1 << bit) != 0 {
                            pages.insert(start_page + (byte_idx * 8 + bit) as u32);
                        }
                    }
                }
                Some(UsageMap {
                    start_page,
                    pages,
                    encoding: UsageMapEncoding::Inline,
                    generation: 0,
                })
            }
            0x01 => Some(UsageMap {
                start_page,
                pages: BTreeSet::new(),
                encoding: UsageMapEncoding::Reference,
                generation: 0,
            }),
            _ => None,
        }
    }

    /// Serialize to the inline on-disk row form. Panics if `self` has been
    /// promoted to reference encoding (callers should check
    /// [`UsageMap::encoding`] first).
    pub fn to_inline_bytes(&self) -> Vec<u8> {
        assert_eq!(self.encoding, UsageMapEncoding::Inline);
        let max_page = self.pages.iter().next_back().copied().unwrap_or(self.start_page);
        let span_bits = (max_page - self.start_page + 1) as usize;
        let span_bytes = span_bits.div_ceil(8).max(1);
        let mut out = vec![0u8; 5 + span_bytes];
        out[0] = 0x00;
        out[1..5].copy_from_slice(&self.start_page.to_le_bytes());
        for &page in &self.pages {
            let bit_idx = (page - self.start_page) as usize;
            out[5 + bit_idx / 8] |= 1 << (bit_idx % 8);
        }
        out
    }

    /// Whether `page_no` is a member of this set.
    pub fn contains(&self, page_no: u32) -> bool {
        self.pages.contains(&page_no)
    }

    /// Add a page number to the set, promoting to reference encoding if the
    /// inline span would now exceed [`INLINE_CAPACITY_BITS`].
    pub fn add(&mut self, page_no: u32) {
        self.pages.insert(page_no);
        self.generation += 1;
        if self.encoding == UsageMapEncoding::Inline {
            let span = self
                .pages
                .iter()
                .next_back()
                .copied()
                .unwrap_or(self.start_page)
                .saturating_sub(self.start_page) as usize
                + 1;
            if span > INLINE_CAPACITY_BITS {
                self.encoding = UsageMapEncoding::Reference;
            }
        }
    }

    /// Remove a page number from the set.
    pub fn remove(&mut self, page_no: u32) {
        self.pages.remove(&page_no);
        self.generation += 1;
    }

    /// Lowest page number in the set, if any.
    pub fn first_page_number(&self) -> Option<u32> {
        self.pages.iter().next().copied()
    }

    /// Highest page number in the set, if any.
    pub fn last_page_number(&self) -> Option<u32> {
        self.pages.iter().next_back().copied()
    }

    /// Which on-disk encoding this map currently uses.
    pub fn encoding(&self) -> UsageMapEncoding {
        self.encoding
    }

    /// Current generation counter; bump on every mutation so outstanding
    /// cursors can detect concurrent modification and re-seek.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A forward cursor over the set's page numbers, bound to the current
    /// generation at construction time.
    pub fn cursor(&self) -> UsageMapCursor<'_> {
        UsageMapCursor {
            map: self,
            generation_at_creation: self.generation,
            last_seen: None,
            exhausted_forward: false,
            exhausted_backward: false,
        }
    }
}

/// Bidirectional cursor over a [`UsageMap`]'s page numbers.
///
/// If the underlying map is mutated after the cursor is created, the next
/// `next()`/`prev()` call re-seeks from the last-seen page number rather
/// than panicking or silently skipping pages.
pub struct UsageMapCursor<'a> {
    map: &'a UsageMap,
    generation_at_creation: u64,
    last_seen: Option<u32>,
    exhausted_forward: bool,
    exhausted_backward: bool,
}

impl<'a> UsageMapCursor<'a> {
    fn revalidate(&mut self) {
        if self.map.generation != self.generation_at_creation {
            self.generation_at_creation = self.map.generation;
            self.exhausted_forward = false;
            self.exhausted_backward = false;
        }
    }

    /// Advance to the next page number in ascending order.
    pub fn next(&mut self) -> Option<u32> {
        self.revalidate();
        if self.exhausted_forward {
            return None;
        }
        let candidate = match self.last_seen {
            None => self.map.pages.iter().next().copied(),
            Some(last) => self.map.pages.range(last + 1..).next().copied(),
        };
        match candidate {
            Some(p) => {
                self.last_seen = Some(p);
                Some(p)
            }
            None => {
                self.exhausted_forward = true;
                None
            }
        }
    }

    /// Advance to the previous page number in descending order.
    pub fn prev(&mut self) -> Option<u32> {
        self.revalidate();
        if self.exhausted_backward {
            return None;
        }
        let candidate = match self.last_seen {
            None => self.map.pages.iter().next_back().copied(),
            Some(last) if last > 0 => self.map.pages.range(..last).next_back().copied(),
            Some(_) => None,
        };
        match candidate {
            Some(p) => {
                self.last_seen = Some(p);
                Some(p)
            }
            None => {
                self.exhausted_backward = true;
                None
            }
        }
    }
}
