//! Element Value Types
//!
//! Every BCD element is stored as a single registry value named `Element`.
//! The value carries a registry type and the raw payload bytes; this module
//! converts between those payloads and typed Rust values.
//!
//! # Value Types
//! - REG_NONE: No type
//! - REG_SZ: Null-terminated UTF-16LE string
//! - REG_EXPAND_SZ: Expandable string (with environment variables)
//! - REG_BINARY: Binary data
//! - REG_DWORD: 32-bit integer (little-endian)
//! - REG_DWORD_BIG_ENDIAN: 32-bit integer (big-endian)
//! - REG_LINK: Symbolic link
//! - REG_MULTI_SZ: Sequence of null-terminated strings, closed by an empty one
//! - REG_QWORD: 64-bit integer (little-endian)

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BcdError, Result};

/// Size of one UTF-16 code unit in bytes
const UTF16_UNIT: usize = 2;

/// Registry value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum RegType {
    /// No type
    #[default]
    #[serde(rename = "RegNone")]
    None = 0,
    /// Null-terminated string
    #[serde(rename = "RegSz")]
    Sz = 1,
    /// Expandable string (with %VARIABLE% references)
    #[serde(rename = "RegExpandSz")]
    ExpandSz = 2,
    /// Binary data
    #[serde(rename = "RegBinary")]
    Binary = 3,
    /// 32-bit little-endian integer
    #[serde(rename = "RegDword")]
    Dword = 4,
    /// 32-bit big-endian integer
    #[serde(rename = "RegDwordBigEndian")]
    DwordBigEndian = 5,
    /// Symbolic link (Unicode string)
    #[serde(rename = "RegLink")]
    Link = 6,
    /// Array of null-terminated strings
    #[serde(rename = "RegMultiSz")]
    MultiSz = 7,
    /// Resource list
    #[serde(rename = "RegResourceList")]
    ResourceList = 8,
    /// Full resource descriptor
    #[serde(rename = "RegFullResourceDescriptor")]
    FullResourceDescriptor = 9,
    /// Resource requirements list
    #[serde(rename = "RegResourceRequirementsList")]
    ResourceRequirementsList = 10,
    /// 64-bit little-endian integer
    #[serde(rename = "RegQword")]
    Qword = 11,
}

impl RegType {
    /// All value types, in registry code order
    pub const ALL: [RegType; 12] = [
        Self::None,
        Self::Sz,
        Self::ExpandSz,
        Self::Binary,
        Self::Dword,
        Self::DwordBigEndian,
        Self::Link,
        Self::MultiSz,
        Self::ResourceList,
        Self::FullResourceDescriptor,
        Self::ResourceRequirementsList,
        Self::Qword,
    ];

    /// Create from raw value
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Symbolic name used in the exchange format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "RegNone",
            Self::Sz => "RegSz",
            Self::ExpandSz => "RegExpandSz",
            Self::Binary => "RegBinary",
            Self::Dword => "RegDword",
            Self::DwordBigEndian => "RegDwordBigEndian",
            Self::Link => "RegLink",
            Self::MultiSz => "RegMultiSz",
            Self::ResourceList => "RegResourceList",
            Self::FullResourceDescriptor => "RegFullResourceDescriptor",
            Self::ResourceRequirementsList => "RegResourceRequirementsList",
            Self::Qword => "RegQword",
        }
    }
}

impl fmt::Display for RegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegType {
    type Err = String;

    /// Accepts `RegSz`, `REG_SZ` and `Sz` spellings, ignoring case
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let bare = folded.strip_prefix("reg").unwrap_or(&folded);
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name()[3..].eq_ignore_ascii_case(bare))
            .ok_or_else(|| format!("unknown value type {s:?}"))
    }
}

// ============================================================================
// String Codec
// ============================================================================

/// Encode a string as UTF-16LE followed by one null terminator
pub fn encode_sz(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity((s.len() + 1) * UTF16_UNIT);
    push_utf16(&mut out, s);
    out
}

/// Decode one null-terminated UTF-16LE string
///
/// Returns the number of bytes consumed (through the terminator, or the
/// whole buffer when no terminator is present) and the decoded text.
pub fn decode_sz(raw: &[u8]) -> Result<(usize, String)> {
    if raw.len() % UTF16_UNIT != 0 {
        return Err(BcdError::Encoding(format!(
            "invalid UTF-16LE byte length: {}",
            raw.len()
        )));
    }

    let mut units = Vec::with_capacity(raw.len() / UTF16_UNIT);
    let mut consumed = raw.len();
    for (i, pair) in raw.chunks_exact(UTF16_UNIT).enumerate() {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            consumed = (i + 1) * UTF16_UNIT;
            break;
        }
        units.push(unit);
    }

    let text = String::from_utf16(&units)
        .map_err(|e| BcdError::Encoding(format!("malformed UTF-16LE: {e}")))?;
    Ok((consumed, text))
}

/// Encode a list of strings as REG_MULTI_SZ
pub fn encode_multi_sz<S: AsRef<str>>(list: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for s in list {
        push_utf16(&mut out, s.as_ref());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Decode a REG_MULTI_SZ payload
///
/// A lone terminator (empty string consuming exactly two bytes) closes the
/// sequence and is not part of the result.
pub fn decode_multi_sz(raw: &[u8]) -> Result<Vec<String>> {
    let mut results = Vec::new();
    let mut remaining = raw;
    while !remaining.is_empty() {
        let (consumed, s) = decode_sz(remaining)?;
        if s.is_empty() && consumed == UTF16_UNIT {
            break;
        }
        results.push(s);
        remaining = &remaining[consumed..];
    }
    Ok(results)
}

fn push_utf16(out: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&[0, 0]);
}

// ============================================================================
// Integer Codec
// ============================================================================

/// Encode a REG_DWORD payload
pub fn encode_dword(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode a REG_DWORD payload; the buffer must be exactly 4 bytes
pub fn decode_dword(raw: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = raw.try_into().map_err(|_| BcdError::InvalidLength {
        kind: RegType::Dword,
        expected: 4,
        actual: raw.len(),
    })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Encode a REG_QWORD payload
pub fn encode_qword(value: u64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode a REG_QWORD payload; the buffer must be exactly 8 bytes
pub fn decode_qword(raw: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = raw.try_into().map_err(|_| BcdError::InvalidLength {
        kind: RegType::Qword,
        expected: 8,
        actual: raw.len(),
    })?;
    Ok(u64::from_le_bytes(bytes))
}

// ============================================================================
// Typed Values
// ============================================================================

/// Decoded element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// REG_SZ text
    Sz(String),
    /// REG_MULTI_SZ list
    MultiSz(Vec<String>),
    /// REG_DWORD integer
    Dword(u32),
    /// REG_QWORD integer
    Qword(u64),
    /// Any other kind, kept as stored
    Raw(RegType, Vec<u8>),
}

impl ElementValue {
    /// Decode a payload according to its registry type
    pub fn decode(kind: RegType, raw: &[u8]) -> Result<Self> {
        Ok(match kind {
            RegType::Sz => Self::Sz(decode_sz(raw)?.1),
            RegType::MultiSz => Self::MultiSz(decode_multi_sz(raw)?),
            RegType::Dword => Self::Dword(decode_dword(raw)?),
            RegType::Qword => Self::Qword(decode_qword(raw)?),
            other => Self::Raw(other, raw.to_vec()),
        })
    }

    /// Registry type this value is stored as
    pub fn kind(&self) -> RegType {
        match self {
            Self::Sz(_) => RegType::Sz,
            Self::MultiSz(_) => RegType::MultiSz,
            Self::Dword(_) => RegType::Dword,
            Self::Qword(_) => RegType::Qword,
            Self::Raw(kind, _) => *kind,
        }
    }

    /// Encode back to the stored payload
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Sz(s) => encode_sz(s),
            Self::MultiSz(list) => encode_multi_sz(list),
            Self::Dword(v) => encode_dword(*v),
            Self::Qword(v) => encode_qword(*v),
            Self::Raw(_, raw) => raw.clone(),
        }
    }
}

impl From<&str> for ElementValue {
    fn from(s: &str) -> Self {
        Self::Sz(s.to_string())
    }
}

impl From<u32> for ElementValue {
    fn from(v: u32) -> Self {
        Self::Dword(v)
    }
}

impl From<u64> for ElementValue {
    fn from(v: u64) -> Self {
        Self::Qword(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reg_type_codes() {
        assert_eq!(RegType::from_u32(1), Some(RegType::Sz));
        assert_eq!(RegType::from_u32(11), Some(RegType::Qword));
        assert_eq!(RegType::from_u32(12), None);
        assert_eq!(RegType::MultiSz as u32, 7);
    }

    #[test]
    fn test_reg_type_parse() {
        assert_eq!("RegSz".parse::<RegType>(), Ok(RegType::Sz));
        assert_eq!("REG_MULTI_SZ".parse::<RegType>(), Ok(RegType::MultiSz));
        assert_eq!("dword".parse::<RegType>(), Ok(RegType::Dword));
        assert_eq!(
            "RegDwordBigEndian".parse::<RegType>(),
            Ok(RegType::DwordBigEndian)
        );
        assert!("RegFloat".parse::<RegType>().is_err());
    }

    #[test]
    fn test_reg_type_serde_names() {
        let json = serde_json::to_string(&RegType::MultiSz).unwrap();
        assert_eq!(json, "\"RegMultiSz\"");
        let kind: RegType = serde_json::from_str("\"RegQword\"").unwrap();
        assert_eq!(kind, RegType::Qword);
    }

    #[test]
    fn test_encode_sz_terminator() {
        assert_eq!(encode_sz(""), vec![0, 0]);
        assert_eq!(encode_sz("Ab"), vec![b'A', 0, b'b', 0, 0, 0]);
    }

    #[test]
    fn test_decode_sz_stops_at_null() {
        let raw = [b'h', 0, b'i', 0, 0, 0, b'x', 0];
        let (consumed, s) = decode_sz(&raw).unwrap();
        assert_eq!(s, "hi");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_decode_sz_without_terminator() {
        let (consumed, s) = decode_sz(&[b'o', 0, b'k', 0]).unwrap();
        assert_eq!(s, "ok");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_decode_sz_odd_length() {
        let err = decode_sz(&[b'a', 0, 0]).unwrap_err();
        assert!(matches!(err, BcdError::Encoding(_)));
    }

    #[test]
    fn test_decode_sz_unpaired_surrogate() {
        let raw = 0xD800u16.to_le_bytes();
        assert!(matches!(decode_sz(&raw), Err(BcdError::Encoding(_))));
    }

    #[test]
    fn test_multi_sz_empty() {
        let raw = encode_multi_sz::<&str>(&[]);
        assert_eq!(raw, vec![0, 0]);
        assert!(decode_multi_sz(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_multi_sz_pair() {
        let raw = encode_multi_sz(&["a", "b"]);
        assert_eq!(raw.len(), 10);
        assert_eq!(decode_multi_sz(&raw).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_multi_sz_without_closing_terminator() {
        let raw = [b'a', 0, 0, 0, b'b', 0];
        assert_eq!(decode_multi_sz(&raw).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_dword_length_enforced() {
        assert_eq!(decode_dword(&[0x0A, 0, 0, 0]).unwrap(), 10);
        let err = decode_dword(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            BcdError::InvalidLength { kind: RegType::Dword, expected: 4, actual: 2 }
        ));
        assert!(decode_qword(&[0; 4]).is_err());
    }

    #[test]
    fn test_element_value_decode() {
        let v = ElementValue::decode(RegType::Sz, &encode_sz("Example")).unwrap();
        assert_eq!(v, ElementValue::Sz("Example".into()));
        let v = ElementValue::decode(RegType::Binary, &[1, 2, 3]).unwrap();
        assert_eq!(v, ElementValue::Raw(RegType::Binary, vec![1, 2, 3]));
        assert_eq!(v.kind(), RegType::Binary);
    }

    #[test]
    fn test_element_value_encode() {
        assert_eq!(ElementValue::from(10u32).encode(), vec![10, 0, 0, 0]);
        assert_eq!(ElementValue::from(1u64).encode().len(), 8);
        assert_eq!(ElementValue::from("x").kind(), RegType::Sz);
    }
}
