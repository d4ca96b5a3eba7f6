//! Per-datatype value encoding.
//!
//! Fixes the physical byte form of every supported column type so that
//! files written by this engine remain readable by the original product.
//! [`DataType`] tags a column; [`Value`] is the decoded, logical form a
//! caller works with; [`encode`]/[`decode`] move between the two using the
//! physical-layout rules a column's `DataType` and length/precision/scale
//! imply.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{NaiveDate, NaiveDateTime};

use crate::JetError;

/// Epoch used by the DATE/TIME physical encoding: 1899-12-30.
fn date_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch date")
}

/// Every data type a Jet column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Byte,
    Int,
    Long,
    Currency,
    Float,
    Double,
    DateTime,
    Binary,
    Text,
    Ole,
    Memo,
    Guid,
    Numeric,
    /// Complex-type column (multi-value, attachment, version history): an
    /// opaque foreign key into a hidden secondary table.
    ComplexType,
    /// Unrecognized/unsupported variant: read and written as opaque bytes.
    Unsupported,
}

impl DataType {
    /// Fixed on-disk width in bytes, or `None` for variable-length types.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            DataType::Boolean => Some(0), // lives in the NULL bitmap, not its own bytes
            DataType::Byte => Some(1),
            DataType::Int => Some(2),
            DataType::Long => Some(4),
            DataType::Currency => Some(8),
            DataType::Float => Some(4),
            DataType::Double => Some(8),
            DataType::DateTime => Some(8),
            DataType::Guid => Some(16),
            DataType::Numeric => Some(17),
            DataType::ComplexType => Some(4),
            DataType::Binary | DataType::Text | DataType::Ole | DataType::Memo => None,
            DataType::Unsupported => None,
        }
    }
}

/// A decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(u8),
    Int(i16),
    Long(i32),
    /// Fixed-point currency, stored internally scaled by 10^4.
    Currency(i64),
    Float(f32),
    Double(f64),
    /// Fractional days since 1899-12-30, exactly as physically stored.
    DateTime(f64),
    Binary(Vec<u8>),
    Text(String),
    Memo(Vec<u8>),
    Ole(Vec<u8>),
    /// Canonicalized `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` form.
    Guid(String),
    /// `(sign, unscaled magnitude, scale)`.
    Numeric { negative: bool, magnitude: [u8; 16], scale: u8 },
    ComplexType(u32),
    Unsupported(Vec<u8>),
}

/// Encode a [`Value`] to its physical byte form for the given [`DataType`].
/// `compressed_unicode` only affects `Text` values; see [`encode_text`].
pub fn encode(value: &Value, data_type: DataType, compressed_unicode: bool) -> Result<Vec<u8>, JetError> {
    match (value, data_type) {
        (Value::Null, _) => Ok(Vec::new()),
        (Value::Byte(b), DataType::Byte) => Ok(vec![*b]),
        (Value::Int(v), DataType::Int) => {
            let mut buf = [0u8; 2];
            LittleEndian::write_i16(&mut buf, *v);
            Ok(buf.to_vec())
        }
        (Value::Long(v), DataType::Long) => {
            let mut buf = [0u8; 4];
            LittleEndian::write_i32(&mut buf, *v);
            Ok(buf.to_vec())
        }
        (Value::Currency(v), DataType::Currency) => {
            let mut buf = [0u8; 8];
            LittleEndian::write_i64(&mut buf, *v);
            Ok(buf.to_vec())
        }
        (Value::Float(v), DataType::Float) => {
            let mut buf = [0u8; 4];
            LittleEndian::write_f32(&mut buf, *v);
            Ok(buf.to_vec())
        }
        (Value::Double(v), DataType::Double) => {
            let mut buf = [0u8; 8];
            LittleEndian::write_f64(&mut buf, *v);
            Ok(buf.to_vec())
        }
        (Value::DateTime(days), DataType::DateTime) => {
            let mut buf = [0u8; 8];
            LittleEndian::write_f64(&mut buf, *days);
            Ok(buf.to_vec())
        }
        (Value::Binary(bytes), DataType::Binary) => Ok(bytes.clone()),
        (Value::Memo(bytes), DataType::Memo) => Ok(bytes.clone()),
        (Value::Ole(bytes), DataType::Ole) => Ok(bytes.clone()),
        (Value::Unsupported(bytes), DataType::Unsupported) => Ok(bytes.clone()),
        (Value::Text(s), DataType::Text) => Ok(encode_text(s, compressed_unicode)),
        (Value::Guid(s), DataType::Guid) => encode_guid(s),
        (Value::Numeric { negative, magnitude, scale: _ }, DataType::Numeric) => {
            let mut buf = [0u8; 17];
            buf[0] = if *negative { 0x00 } else { 0xFF };
            buf[1..17].copy_from_slice(magnitude);
            Ok(buf.to_vec())
        }
        (Value::ComplexType(id), DataType::ComplexType) => {
            let mut buf = [0u8; 4];
            LittleEndian::write_u32(&mut buf, *id);
            Ok(buf.to_vec())
        }
        _ => Err(JetError::InvalidArgument(format!(
            "value {value:?} does not match declared type {data_type:?}"
        ))),
    }
}

/// Decode physical bytes into a [`Value`] for the given [`DataType`].
pub fn decode(bytes: &[u8], data_type: DataType) -> Result<Value, JetError> {
    match data_type {
        DataType::Byte => bytes
            .first()
            .map(|b| Value::Byte(*b))
            .ok_or_else(|| too_short(data_type)),
        DataType::Int => check_len(bytes, 2, data_type).map(|b| Value::Int(LittleEndian::read_i16(b))),
        DataType::Long => check_len(bytes, 4, data_type).map(|b| Value::Long(LittleEndian::read_i32(b))),
        DataType::Currency => {
            check_len(bytes, 8, data_type).map(|b| Value::Currency(LittleEndian::read_i64(b)))
        }
        DataType::Float => check_len(bytes, 4, data_type).map(|b| Value::Float(LittleEndian::read_f32(b))),
        DataType::Double => check_len(bytes, 8, data_type).map(|b| Value::Double(LittleEndian::read_f64(b))),
        DataType::DateTime => {
            check_len(bytes, 8, data_type).map(|b| Value::DateTime(LittleEndian::read_f64(b)))
        }
        DataType::Binary => Ok(Value::Binary(bytes.to_vec())),
        DataType::Memo => Ok(Value::Memo(bytes.to_vec())),
        DataType::Ole => Ok(Value::Ole(bytes.to_vec())),
        DataType::Unsupported => Ok(Value::Unsupported(bytes.to_vec())),
        DataType::Text => decode_text(bytes),
        DataType::Guid => decode_guid(bytes),
        DataType::Numeric => {
            let b = check_len(bytes, 17, data_type)?;
            let mut magnitude = [0u8; 16];
            magnitude.copy_from_slice(&b[1..17]);
            Ok(Value::Numeric {
                negative: b[0] == 0x00,
                magnitude,
                scale: 0,
            })
        }
        DataType::ComplexType => {
            check_len(bytes, 4, data_type).map(|b| Value::ComplexType(LittleEndian::read_u32(b)))
        }
        DataType::Boolean => Err(JetError::InvalidArgument(
            "boolean values live in the NULL bitmap, not a byte field".into(),
        )),
    }
}

fn too_short(data_type: DataType) -> JetError {
    JetError::CorruptedFormat(format!("value buffer too short for {data_type:?}"))
}

fn check_len(bytes: &[u8], len: usize, data_type: DataType) -> Result<&[u8], JetError> {
    if bytes.len() < len {
        Err(too_short(data_type))
    } else {
        Ok(&bytes[..len])
    }
}

/// Encode text using the compressed-ASCII scheme when every UTF-16 code unit
/// fits in one byte and the column allows compression, else raw UTF-16LE. A
/// 2-byte compression header (`0xFF 0xFE`) precedes compressed payloads,
/// matching the convention the original product uses to distinguish the two
/// encodings in a stored value. Some columns are created with compression
/// disabled and must always store raw UCS-2 regardless of content.
fn encode_text(s: &str, compressed_unicode: bool) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    if compressed_unicode && units.iter().all(|&u| u <= 0xFF) {
        let mut out = Vec::with_capacity(2 + units.len());
        out.push(0xFF);
        out.push(0xFE);
        out.extend(units.iter().map(|&u| u as u8));
        out
    } else {
        let mut out = Vec::with_capacity(units.len() * 2);
        for u in units {
            out.extend_from_slice(&u.to_le_bytes());
        }
        out
    }
}

fn decode_text(bytes: &[u8]) -> Result<Value, JetError> {
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let s: String = bytes[2..].iter().map(|&b| b as char).collect();
        Ok(Value::Text(s))
    } else {
        if bytes.len() % 2 != 0 {
            return Err(JetError::CorruptedFormat(
                "UTF-16 text payload has an odd number of bytes".into(),
            ));
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map(Value::Text)
            .map_err(|e| JetError::CorruptedFormat(format!("invalid UTF-16 text: {e}")))
    }
}

/// Parse `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` (braces/whitespace/case
/// insensitive) and encode the canonical 16-byte internal form.
fn encode_guid(s: &str) -> Result<Vec<u8>, JetError> {
    let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}');
    let hex: String = trimmed.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 {
        return Err(JetError::ValueOutOfRange(format!(
            "not a valid GUID: {s}"
        )));
    }
    let mut bytes = [0u8; 16];
    for i in 0..16 {
        bytes[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| JetError::ValueOutOfRange(format!("not a valid GUID: {s}")))?;
    }
    Ok(bytes.to_vec())
}

fn decode_guid(bytes: &[u8]) -> Result<Value, JetError> {
    let b = check_len(bytes, 16, DataType::Guid)?;
    let s = format!(
        "{{{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
    );
    Ok(Value::Guid(s))
}

/// Convert a `NaiveDateTime` to the physical fractional-days-since-epoch
/// representation used by [`Value::DateTime`].
pub fn to_days_double(dt: NaiveDateTime) -> f64 {
    let epoch = date_epoch().and_hms_opt(0, 0, 0).expect("midnight is valid");
    let delta = dt.signed_duration_since(epoch);
    delta.num_milliseconds() as f64 / 86_400_000.0
}

/// Convert the physical fractional-days-since-epoch representation back to
/// a `NaiveDateTime`, rounding to the nearest millisecond.
pub fn from_days_double(days: f64) -> NaiveDateTime {
    let epoch = date_epoch().and_hms_opt(0, 0, 0).expect("midnight is valid");
    let millis = (days * 86_400_000.0).round() as i64;
    epoch + chrono::Duration::milliseconds(millis)
}
