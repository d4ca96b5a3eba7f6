//! Paged file I/O.
//!
//! [`PageChannel`] is the sole owner of the underlying file handle: it opens
//! the file, detects the format from page 0, and exposes read/write/allocate/
//! deallocate over fixed-size pages, applying the header mask on page 0 and
//! delegating every other page to the configured [`CodecHandler`].

use std::fs::{File, OpenOptions as FsOpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::jet::codec::{CodecHandler, IdentityCodec};
use crate::jet::constants::*;
use crate::jet::format::FormatDescriptor;
use crate::JetError;

/// Paged I/O over a single Jet database file.
///
/// The channel owns the file handle for its entire lifetime; the handle is
/// released when the channel is dropped (scoped acquisition with guaranteed
/// release on every exit path, including error paths, since `File`'s `Drop`
/// closes the descriptor unconditionally).
pub struct PageChannel {
    file: File,
    format: FormatDescriptor,
    codec: Box<dyn CodecHandler>,
    auto_sync: bool,
    read_only: bool,
    page_count: u64,
}

impl PageChannel {
    /// Open an existing file, auto-detecting the format from page 0.
    pub fn open<P: AsRef<Path>>(
        path: P,
        read_only: bool,
        auto_sync: bool,
        codec: Box<dyn CodecHandler>,
    ) -> Result<Self, JetError> {
        let path = path.as_ref();
        let file = FsOpenOptions::new()
            .read(true)
            .write(!read_only)
            .open(path)
            .map_err(|e| JetError::IoFailure(format!("cannot open {}: {e}", path.display())))?;

        let file_len = file
            .metadata()
            .map_err(|e| JetError::IoFailure(format!("cannot stat {}: {e}", path.display())))?
            .len();

        // Read a maximal-size page to probe the header; the real page size is
        // only known after the format is detected.
        let probe_len = std::cmp::min(file_len, SIZE_PAGE_MODERN as u64) as usize;
        if probe_len < HEADER_VERSION_OFFSET + 1 {
            return Err(JetError::CorruptedFormat(format!(
                "file too small to be a Jet database: {file_len} bytes"
            )));
        }
        let mut probe = vec![0u8; probe_len];
        let mut f = &file;
        f.seek(SeekFrom::Start(0))?;
        f.read_exact(&mut probe)?;

        let format = FormatDescriptor::detect(&probe)?;
        if file_len % format.page_size as u64 != 0 {
            return Err(JetError::CorruptedFormat(format!(
                "file size {file_len} is not a multiple of the page size {}",
                format.page_size
            )));
        }

        Ok(PageChannel {
            file,
            format,
            codec,
            auto_sync,
            read_only,
            page_count: file_len / format.page_size as u64,
        })
    }

    /// Create a brand-new database file with the given format and header
    /// catalog-root row id. Writes a single zeroed, masked page 0.
    pub fn create<P: AsRef<Path>>(
        path: P,
        format: FormatDescriptor,
        codec: Box<dyn CodecHandler>,
        auto_sync: bool,
    ) -> Result<Self, JetError> {
        let path = path.as_ref();
        let mut file = FsOpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| JetError::IoFailure(format!("cannot create {}: {e}", path.display())))?;

        let mut page0 = vec![0u8; format.page_size as usize];
        page0[..HEADER_SIGNATURE_LEN].copy_from_slice(&HEADER_SIGNATURE);
        page0[HEADER_VERSION_OFFSET] = format.version_code();
        format.apply_header_mask(&mut page0);
        file.write_all(&page0)?;
        file.flush()?;

        Ok(PageChannel {
            file,
            format,
            codec,
            auto_sync,
            read_only: false,
            page_count: 1,
        })
    }

    /// The detected/configured format.
    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    /// Number of pages currently in the file.
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    fn validate_page_no(&self, page_no: u64) -> Result<(), JetError> {
        if page_no >= self.page_count {
            return Err(JetError::CorruptedFormat(format!(
                "page {page_no} out of range (file has {} pages)",
                self.page_count
            )));
        }
        Ok(())
    }

    /// Read one full page, applying the header mask (page 0) or the codec
    /// (every other page).
    pub fn read_page(&mut self, page_no: u64) -> Result<Vec<u8>, JetError> {
        self.validate_page_no(page_no)?;
        let page_size = self.format.page_size as usize;
        let mut buf = vec![0u8; page_size];
        self.file
            .seek(SeekFrom::Start(page_no * page_size as u64))?;
        self.file.read_exact(&mut buf)?;

        if page_no == 0 {
            self.format.apply_header_mask(&mut buf);
        } else {
            self.codec.decode_page(&mut buf, page_no as u32)?;
        }
        Ok(buf)
    }

    /// Write `data` at `page_no`, starting at byte `page_offset` within the
    /// page. If the codec cannot encode a partial page and this write does
    /// not cover the whole page, the current page is read, the slice is
    /// overlaid, and the full page is re-encoded.
    pub fn write_page(
        &mut self,
        data: &[u8],
        page_no: u64,
        page_offset: usize,
    ) -> Result<(), JetError> {
        if self.read_only {
            return Err(JetError::UnsupportedFormat(
                "channel opened read-only".into(),
            ));
        }
        self.validate_page_no(page_no)?;
        let page_size = self.format.page_size as usize;
        if page_offset + data.len() > page_size {
            return Err(JetError::CorruptedFormat(format!(
                "write of {} bytes at offset {page_offset} overflows page size {page_size}",
                data.len()
            )));
        }

        let is_full_page = page_offset == 0 && data.len() == page_size;

        let encoded: Vec<u8> = if page_no == 0 {
            let mut full = if is_full_page {
                data.to_vec()
            } else {
                let mut current = self.read_page(0)?;
                // page 0 is returned unmasked by read_page; re-overlay and re-mask below
                current[page_offset..page_offset + data.len()].copy_from_slice(data);
                current
            };
            self.format.apply_header_mask(&mut full);
            full
        } else if is_full_page || self.codec.can_encode_partial_page() {
            self.codec.encode_page(data, page_no as u32, page_offset)?
        } else {
            let mut current = self.read_page(page_no)?;
            current[page_offset..page_offset + data.len()].copy_from_slice(data);
            self.codec.encode_page(&current, page_no as u32, 0)?
        };

        let write_offset = if page_no == 0 || !(is_full_page || self.codec.can_encode_partial_page())
        {
            page_no * page_size as u64
        } else {
            page_no * page_size as u64 + page_offset as u64
        };

        self.file.seek(SeekFrom::Start(write_offset))?;
        self.file.write_all(&encoded)?;
        if self.auto_sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Append one page of zeroed bytes, returning its page number.
    pub fn allocate_new_page(&mut self) -> Result<u64, JetError> {
        if self.read_only {
            return Err(JetError::UnsupportedFormat(
                "channel opened read-only".into(),
            ));
        }
        let page_no = self.page_count;
        let page_size = self.format.page_size as usize;
        self.file
            .seek(SeekFrom::Start(page_no * page_size as u64))?;
        self.file.write_all(&vec![0u8; page_size])?;
        if self.auto_sync {
            self.file.sync_data()?;
        }
        self.page_count += 1;
        Ok(page_no)
    }

    /// Mark a page as deallocated by overwriting its leading marker bytes.
    pub fn deallocate_page(&mut self, page_no: u64) -> Result<(), JetError> {
        self.write_page(&INVALID_PAGE_MARKER.to_le_bytes(), page_no, PAGE_TYPE_OFFSET)
    }

    /// Batch-write bracket: defers fsync until `f` returns, even on error.
    pub fn with_deferred_sync<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, JetError>,
    ) -> Result<T, JetError> {
        let was_auto_sync = self.auto_sync;
        self.auto_sync = false;
        let result = f(self);
        self.auto_sync = was_auto_sync;
        if result.is_ok() && was_auto_sync {
            self.file.sync_data()?;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jet::format::JetVersion;
    use tempfile::NamedTempFile;

    fn fresh_channel() -> (NamedTempFile, PageChannel) {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        let ch = PageChannel::create(
            tmp.path(),
            FormatDescriptor::v4(),
            Box::new(IdentityCodec),
            false,
        )
        .unwrap();
        (tmp, ch)
    }

    #[test]
    fn create_then_reopen_detects_format() {
        let (tmp, ch) = fresh_channel();
        assert_eq!(ch.format().version, JetVersion::V4);
        drop(ch);
        let mut reopened =
            PageChannel::open(tmp.path(), false, false, Box::new(IdentityCodec)).unwrap();
        assert_eq!(reopened.page_count(), 1);
        let page0 = reopened.read_page(0).unwrap();
        assert_eq!(&page0[..4], &HEADER_SIGNATURE);
    }

    #[test]
    fn allocate_and_write_round_trips() {
        let (_tmp, mut ch) = fresh_channel();
        let page_no = ch.allocate_new_page().unwrap();
        assert_eq!(page_no, 1);
        let payload = vec![0xABu8; ch.format().page_size as usize];
        ch.write_page(&payload, page_no, 0).unwrap();
        let read_back = ch.read_page(page_no).unwrap();
        assert_eq!(read_back, payload);
    }

    #[test]
    fn write_out_of_range_page_fails() {
        let (_tmp, mut ch) = fresh_channel();
        let payload = vec![0u8; ch.format().page_size as usize];
        assert!(ch.write_page(&payload, 5, 0).is_err());
    }

    #[test]
    fn read_only_channel_rejects_writes() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        {
            PageChannel::create(
                tmp.path(),
                FormatDescriptor::v4(),
                Box::new(IdentityCodec),
                false,
            )
            .unwrap();
        }
        let mut ch = PageChannel::open(tmp.path(), true, false, Box::new(IdentityCodec)).unwrap();
        assert!(ch.allocate_new_page().is_err());
    }

    #[test]
    fn deallocate_page_marks_it_invalid() {
        let (_tmp, mut ch) = fresh_channel();
        let page_no = ch.allocate_new_page().unwrap();
        ch.deallocate_page(page_no).unwrap();
        let data = ch.read_page(page_no).unwrap();
        assert_eq!(&data[0..4], &INVALID_PAGE_MARKER.to_le_bytes());
    }
}
