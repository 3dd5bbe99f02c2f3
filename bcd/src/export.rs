//! Exchange Representation
//!
//! Serializable projection of objects: every element carries its kind and
//! base64 payload, plus a decoded convenience field when the kind is Sz,
//! MultiSz or Dword and decoding succeeds.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::object::{BcdElement, BcdObject};
use crate::value::RegType;

/// Exported object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectExport {
    pub description: u32,
    pub elements: BTreeMap<String, ElementExport>,
}

/// Exported element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementExport {
    pub kind: RegType,
    /// Base64 of the stored payload
    pub raw: String,
    #[serde(rename = "valueSz", default, skip_serializing_if = "Option::is_none")]
    pub value_sz: Option<String>,
    #[serde(rename = "valueMultiSz", default, skip_serializing_if = "Option::is_none")]
    pub value_multi_sz: Option<Vec<String>>,
    #[serde(rename = "valueDword", default, skip_serializing_if = "Option::is_none")]
    pub value_dword: Option<u32>,
}

/// Result of an enumeration, keyed by object id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerateResponse {
    pub objects: BTreeMap<String, ObjectExport>,
}

impl ElementExport {
    pub fn from_element(element: &BcdElement) -> Self {
        let mut export = Self {
            kind: element.kind(),
            raw: STANDARD.encode(element.raw()),
            value_sz: None,
            value_multi_sz: None,
            value_dword: None,
        };
        let decoded = match element.kind() {
            RegType::Sz => element
                .string()
                .map(|s| export.value_sz = Some(s).filter(|s| !s.is_empty())),
            RegType::MultiSz => element.multi_string().map(|l| export.value_multi_sz = Some(l)),
            RegType::Dword => element.dword().map(|d| export.value_dword = Some(d)),
            _ => Ok(()),
        };
        if let Err(e) = decoded {
            warn!("element {} not decoded: {e}", element.key());
        }
        export
    }
}

impl From<&BcdObject> for ObjectExport {
    fn from(object: &BcdObject) -> Self {
        Self {
            description: object.description().raw(),
            elements: object
                .elements()
                .iter()
                .map(|(key, element)| (key.clone(), ElementExport::from_element(element)))
                .collect(),
        }
    }
}

impl BcdObject {
    /// Exchange projection of this object
    pub fn to_export(&self) -> ObjectExport {
        ObjectExport::from(self)
    }
}

impl EnumerateResponse {
    pub fn from_objects<'a>(objects: impl IntoIterator<Item = &'a BcdObject>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|object| (object.id().to_string(), object.to_export()))
                .collect(),
        }
    }
}
