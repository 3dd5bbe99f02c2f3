//! Hive Image Files
//!
//! A [`MemoryHive`](super::MemoryHive) is persisted as a JSON tree of keys
//! and values. Value payloads are base64 so the image stays byte-exact.

use serde::{Deserialize, Serialize};

use crate::value::RegType;

/// Format tag written at the top of every image
pub const IMAGE_FORMAT: &str = "bcd-hive-image";

/// Current image version
pub const IMAGE_VERSION: u32 = 1;

/// Serialized hive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveImage {
    pub format: String,
    pub version: u32,
    pub root: KeyImage,
}

/// Serialized key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyImage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subkeys: Vec<KeyImage>,
}

/// Serialized value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueImage {
    pub name: String,
    pub kind: RegType,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl HiveImage {
    pub fn new(root: KeyImage) -> Self {
        Self {
            format: IMAGE_FORMAT.to_string(),
            version: IMAGE_VERSION,
            root,
        }
    }

    /// True if the header names a format this build can load
    pub fn is_supported(&self) -> bool {
        self.format == IMAGE_FORMAT && self.version == IMAGE_VERSION
    }
}

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
