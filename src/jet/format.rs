//! Format version descriptors.
//!
//! [`FormatDescriptor`] is a static description of one on-disk format
//! version: page size, size limits, byte order, charset, and the header
//! obfuscation mask applied to page 0. [`FormatDescriptor::detect`] reads the
//! version byte from an already-unmasked page 0 and selects a descriptor.

use crate::jet::constants::*;
use crate::jet::value::DataType;
use crate::JetError;

/// One of the three format generations this engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JetVersion {
    /// Jet 3 (Access 97). 2048-byte pages, no Unicode text, no encryption.
    V3,
    /// Jet 4 (Access 2000-2003). 4096-byte pages, UCS-2 text.
    V4,
    /// ACE / accdb (Access 2007+). 4096-byte pages, AES page-level encryption
    /// available via a [`crate::jet::codec::CodecHandler`].
    V5,
}

impl JetVersion {
    fn version_code(self) -> u8 {
        match self {
            JetVersion::V3 => VERSION_CODE_V3,
            JetVersion::V4 => VERSION_CODE_V4,
            JetVersion::V5 => VERSION_CODE_V5,
        }
    }
}

/// Static description of a format version.
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    /// Which generation this descriptor represents.
    pub version: JetVersion,
    /// Fixed page size in bytes for this format.
    pub page_size: u32,
    /// Maximum row size in bytes (excluding long-value overflow payloads).
    pub max_row_size: usize,
    /// Maximum database file size in bytes.
    pub max_database_size: u64,
    /// Header-mask byte sequence XORed over the masked region of page 0.
    pub header_mask: &'static [u8],
    /// Default codepage/charset identifier for this format.
    pub default_charset: &'static str,
    /// Whether this format version accepts write operations.
    pub read_only: bool,
}

/// Jet 3 header mask. Repeats over [`HEADER_MASK_LEN`] bytes.
const MASK_V3: [u8; 4] = [0xB0, 0x4B, 0xA4, 0x4B];
/// Jet 4 header mask.
const MASK_V4: [u8; 4] = [0x6B, 0x72, 0x61, 0x5F];
/// ACE/accdb header mask (page-0 masking only; row data uses AES via `CodecHandler`).
const MASK_V5: [u8; 4] = [0x18, 0x3E, 0x92, 0x0A];

impl FormatDescriptor {
    /// Static descriptor for Jet 3 (`.mdb`, Access 97).
    pub fn v3() -> Self {
        FormatDescriptor {
            version: JetVersion::V3,
            page_size: SIZE_PAGE_V3,
            max_row_size: 2008,
            max_database_size: 1 << 30,
            header_mask: &MASK_V3,
            default_charset: "windows-1252",
            read_only: false,
        }
    }

    /// Static descriptor for Jet 4 (`.mdb`, Access 2000-2003).
    pub fn v4() -> Self {
        FormatDescriptor {
            version: JetVersion::V4,
            page_size: SIZE_PAGE_MODERN,
            max_row_size: 4060,
            max_database_size: 2u64.pow(31),
            header_mask: &MASK_V4,
            default_charset: "UTF-16LE",
            read_only: false,
        }
    }

    /// Static descriptor for the ACE format (`.accdb`, Access 2007+).
    pub fn v5() -> Self {
        FormatDescriptor {
            version: JetVersion::V5,
            page_size: SIZE_PAGE_MODERN,
            max_row_size: 4060,
            max_database_size: 2u64.pow(37),
            header_mask: &MASK_V5,
            default_charset: "UTF-16LE",
            read_only: false,
        }
    }

    /// Detect the format by matching the version byte of an **unmasked** page 0.
    pub fn detect(unmasked_page0: &[u8]) -> Result<Self, JetError> {
        if unmasked_page0.len() < HEADER_SIGNATURE_LEN
            || unmasked_page0[..HEADER_SIGNATURE_LEN] != HEADER_SIGNATURE
        {
            return Err(JetError::UnsupportedFormat(
                "page 0 does not carry a recognized engine signature".into(),
            ));
        }
        if unmasked_page0.len() <= HEADER_VERSION_OFFSET {
            return Err(JetError::CorruptedFormat(
                "page 0 too short to carry a format version byte".into(),
            ));
        }
        let code = unmasked_page0[HEADER_VERSION_OFFSET];
        match code {
            c if c == VERSION_CODE_V3 => Ok(Self::v3()),
            c if c == VERSION_CODE_V4 => Ok(Self::v4()),
            c if c == VERSION_CODE_V5 => Ok(Self::v5()),
            other => Err(JetError::UnsupportedFormat(format!(
                "unrecognized format version code 0x{other:02x}"
            ))),
        }
    }

    /// Apply (or remove — the XOR mask is its own inverse) the header mask to
    /// the masked region of a page-0 buffer, in place.
    pub fn apply_header_mask(&self, page0: &mut [u8]) {
        let end = std::cmp::min(page0.len(), HEADER_MASK_OFFSET + HEADER_MASK_LEN);
        if end <= HEADER_MASK_OFFSET {
            return;
        }
        for (i, byte) in page0[HEADER_MASK_OFFSET..end].iter_mut().enumerate() {
            *byte ^= self.header_mask[i % self.header_mask.len()];
        }
    }

    /// Whether `data_type` is representable in this format version.
    ///
    /// Jet 3 predates the wide numeric and complex-type columns introduced
    /// later; everything else is supported by every version this engine
    /// targets.
    pub fn supports(&self, data_type: DataType) -> bool {
        match self.version {
            JetVersion::V3 => !matches!(data_type, DataType::ComplexType),
            JetVersion::V4 | JetVersion::V5 => true,
        }
    }

    /// The version code this descriptor expects at [`HEADER_VERSION_OFFSET`].
    pub fn version_code(&self) -> u8 {
        self.version.version_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page0_with_version(code: u8) -> Vec<u8> {
        let mut page = vec![0u8; SIZE_PAGE_MODERN as usize];
        page[..HEADER_SIGNATURE_LEN].copy_from_slice(&HEADER_SIGNATURE);
        page[HEADER_VERSION_OFFSET] = code;
        page
    }

    #[test]
    fn detects_each_known_version() {
        assert_eq!(
            FormatDescriptor::detect(&page0_with_version(VERSION_CODE_V3))
                .unwrap()
                .version,
            JetVersion::V3
        );
        assert_eq!(
            FormatDescriptor::detect(&page0_with_version(VERSION_CODE_V4))
                .unwrap()
                .version,
            JetVersion::V4
        );
        assert_eq!(
            FormatDescriptor::detect(&page0_with_version(VERSION_CODE_V5))
                .unwrap()
                .version,
            JetVersion::V5
        );
    }

    #[test]
    fn rejects_bad_signature() {
        let mut page = page0_with_version(VERSION_CODE_V4);
        page[0] = 0xFF;
        assert!(FormatDescriptor::detect(&page).is_err());
    }

    #[test]
    fn rejects_unknown_version_code() {
        let page = page0_with_version(0x7F);
        assert!(FormatDescriptor::detect(&page).is_err());
    }

    #[test]
    fn header_mask_is_its_own_inverse() {
        let fmt = FormatDescriptor::v4();
        let mut page = page0_with_version(VERSION_CODE_V4);
        let original = page.clone();
        fmt.apply_header_mask(&mut page);
        assert_ne!(page[HEADER_MASK_OFFSET], original[HEADER_MASK_OFFSET]);
        fmt.apply_header_mask(&mut page);
        assert_eq!(page, original);
    }

    #[test]
    fn v3_does_not_support_complex_type_columns() {
        let fmt = FormatDescriptor::v3();
        assert!(!fmt.supports(DataType::ComplexType));
        assert!(fmt.supports(DataType::Long));
    }
}
