//! BCD Objects and Elements
//!
//! High-level store API over a [`HiveStore`]:
//!
//! - `BcdStore::enumerate` - Read every object (or one by id)
//! - `BcdStore::get_object` - Read one object with its elements
//! - `BcdStore::upsert_object` - Create or reuse an object and set its type
//! - `BcdStore::set_element` - Create or replace one element
//! - `BcdStore::commit` / `BcdStore::close` - Persist changes
//!
//! Reads are strict: an object without a `Description\Type` DWORD is a
//! schema error, and a schema error in any object fails the whole
//! enumeration rather than silently hiding that object.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};

use crate::description::BcdDescription;
use crate::element_types::{self, BcdElementMeta};
use crate::error::{BcdError, Result};
use crate::hive::{
    HiveStore, DESCRIPTION_KEY, ELEMENTS_KEY, ELEMENT_VALUE, TYPE_VALUE,
};
use crate::value::{self, ElementValue, RegType};

/// One element of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcdElement {
    key: String,
    kind: RegType,
    raw: Vec<u8>,
}

impl BcdElement {
    pub fn new(key: impl Into<String>, kind: RegType, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            kind,
            raw: raw.into(),
        }
    }

    /// Element code as stored (8 hex digits)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> RegType {
        self.kind
    }

    /// Payload exactly as stored
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn expect_kind(&self, expected: RegType) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(BcdError::KindMismatch {
                expected,
                actual: self.kind,
            })
        }
    }

    /// REG_SZ payload as text
    pub fn string(&self) -> Result<String> {
        self.expect_kind(RegType::Sz)?;
        Ok(value::decode_sz(&self.raw)?.1)
    }

    /// REG_MULTI_SZ payload as a list
    pub fn multi_string(&self) -> Result<Vec<String>> {
        self.expect_kind(RegType::MultiSz)?;
        value::decode_multi_sz(&self.raw)
    }

    /// REG_DWORD payload
    pub fn dword(&self) -> Result<u32> {
        self.expect_kind(RegType::Dword)?;
        value::decode_dword(&self.raw)
    }

    /// REG_QWORD payload
    pub fn qword(&self) -> Result<u64> {
        self.expect_kind(RegType::Qword)?;
        value::decode_qword(&self.raw)
    }

    /// Payload decoded according to its kind
    pub fn value(&self) -> Result<ElementValue> {
        ElementValue::decode(self.kind, &self.raw)
    }
}

/// Human-readable rendering: strings as text, lists one entry per line,
/// everything else as kind and hex
impl fmt::Display for BcdElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RegType::Sz => match self.string() {
                Ok(s) => f.write_str(&s),
                Err(e) => write!(f, "ERROR: {e}"),
            },
            RegType::MultiSz => match self.multi_string() {
                Ok(list) => f.write_str(&list.join("\n")),
                Err(e) => write!(f, "ERROR: {e}"),
            },
            kind => write!(f, "Type={kind}, Raw={}", hex::encode(&self.raw)),
        }
    }
}

/// One BCD object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcdObject {
    id: String,
    description: BcdDescription,
    elements: BTreeMap<String, BcdElement>,
}

impl BcdObject {
    pub fn new(id: impl Into<String>, description: BcdDescription) -> Self {
        Self {
            id: id.into(),
            description,
            elements: BTreeMap::new(),
        }
    }

    /// Object identifier, e.g. `{9dea862c-5cdd-4e70-acc1-f32b344d4795}`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> BcdDescription {
        self.description
    }

    pub fn elements(&self) -> &BTreeMap<String, BcdElement> {
        &self.elements
    }

    pub fn element(&self, key: &str) -> Option<&BcdElement> {
        self.elements.get(key)
    }

    /// Elements in key order
    pub fn sorted_elements(&self) -> impl Iterator<Item = &BcdElement> {
        self.elements.values()
    }

    /// Catalog entry for `key` on this kind of object
    pub fn element_meta(&self, key: &str) -> Option<&'static BcdElementMeta> {
        element_types::resolve(self.description, key)
    }

    /// Display name for `key`: catalog name, or the key itself
    pub fn element_name<'a>(&self, key: &'a str) -> &'a str {
        match self.element_meta(key) {
            Some(meta) => meta.name,
            None => key,
        }
    }

    pub(crate) fn insert(&mut self, element: BcdElement) {
        self.elements.insert(element.key.clone(), element);
    }
}

/// Which objects `enumerate` returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFilter {
    All,
    /// Exactly this id
    Id(String),
}

impl ObjectFilter {
    /// `"all"` or empty text selects every object, anything else one id
    pub fn parse(text: &str) -> Self {
        if text.is_empty() || text == "all" {
            Self::All
        } else {
            Self::Id(text.to_string())
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Id(wanted) => wanted == id,
        }
    }
}

/// BCD store over an exclusively owned hive
pub struct BcdStore<H: HiveStore> {
    hive: H,
}

impl<H: HiveStore> BcdStore<H> {
    pub fn new(hive: H) -> Self {
        Self { hive }
    }

    pub fn hive(&self) -> &H {
        &self.hive
    }

    pub fn hive_mut(&mut self) -> &mut H {
        &mut self.hive
    }

    /// Release the hive without committing
    pub fn into_inner(self) -> H {
        self.hive
    }

    /// Read every object accepted by `filter`, keyed by id
    pub fn enumerate(&self, filter: &ObjectFilter) -> Result<BTreeMap<String, BcdObject>> {
        let root = self.hive.objects_root()?;
        let mut objects = BTreeMap::new();
        for (node, id) in self.hive.read_children(root)? {
            if !filter.matches(&id) {
                continue;
            }
            trace!("reading object {id}");
            let object = self.read_object(node, &id)?;
            objects.insert(id, object);
        }
        debug!("enumerated {} objects", objects.len());
        Ok(objects)
    }

    /// Read one object
    pub fn get_object(&self, id: &str) -> Result<BcdObject> {
        let node = self.find_object(id)?;
        self.read_object(node, id)
    }

    /// Create the object if absent and (re)write its description
    ///
    /// Existing elements are left in the store but are not loaded into the
    /// returned object; read it back with `get_object` to see them.
    pub fn upsert_object(&mut self, id: &str, description: BcdDescription) -> Result<BcdObject> {
        let root = self.hive.objects_root()?;
        let node = self.hive.upsert_child(root, id)?;
        let description_node = self.hive.upsert_child(node, DESCRIPTION_KEY)?;
        self.hive.set_value(
            description_node,
            TYPE_VALUE,
            RegType::Dword,
            &value::encode_dword(description.raw()),
        )?;
        self.hive.upsert_child(node, ELEMENTS_KEY)?;
        debug!("upserted object {id} ({description})");
        Ok(BcdObject::new(id, description))
    }

    /// Create or replace element `key` of `object`, in the store and in memory
    pub fn set_element(
        &mut self,
        object: &mut BcdObject,
        key: &str,
        kind: RegType,
        raw: &[u8],
    ) -> Result<()> {
        if element_types::parse_element_key(key).is_none() {
            return Err(BcdError::InvalidElementKey(key.to_string()));
        }
        let node = self.find_object(&object.id)?;
        let elements = self.hive.upsert_child(node, ELEMENTS_KEY)?;

        // Hive names compare case-insensitively; keep the spelling already stored
        let key = self
            .hive
            .read_children(elements)?
            .into_iter()
            .map(|(_, name)| name)
            .find(|name| name.eq_ignore_ascii_case(key))
            .unwrap_or_else(|| key.to_string());

        let element_node = self.hive.upsert_child(elements, &key)?;
        self.hive.set_value(element_node, ELEMENT_VALUE, kind, raw)?;
        debug!("set {}\\{key} = {kind} ({} bytes)", object.id, raw.len());
        object.elements.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        object.insert(BcdElement::new(key, kind, raw));
        Ok(())
    }

    /// Set an element from a typed value
    pub fn set_element_value(
        &mut self,
        object: &mut BcdObject,
        key: &str,
        value: &ElementValue,
    ) -> Result<()> {
        self.set_element(object, key, value.kind(), &value.encode())
    }

    /// Persist pending changes
    pub fn commit(&mut self) -> Result<()> {
        self.hive.commit()
    }

    /// Commit if the hive is writable, then release it
    pub fn close(mut self) -> Result<()> {
        if self.hive.is_writable() {
            self.hive.commit()?;
        }
        Ok(())
    }

    fn find_object(&self, id: &str) -> Result<H::Key> {
        let root = self.hive.objects_root()?;
        self.hive
            .find_child(root, id)?
            .ok_or_else(|| BcdError::NotFound(format!("object {id}")))
    }

    fn read_object(&self, node: H::Key, id: &str) -> Result<BcdObject> {
        let description_node = self
            .hive
            .find_child(node, DESCRIPTION_KEY)?
            .ok_or_else(|| BcdError::Schema(format!("{id}\\Description does not exist")))?;
        let type_value = self
            .hive
            .get_value(description_node, TYPE_VALUE)?
            .ok_or_else(|| BcdError::Schema(format!("{id}\\Description\\Type does not exist")))?;
        if type_value.kind != RegType::Dword {
            return Err(BcdError::Schema(format!(
                "{id}\\Description\\Type is {} not {}",
                type_value.kind,
                RegType::Dword
            )));
        }
        let description = value::decode_dword(&type_value.data)
            .map(BcdDescription::from_raw)
            .map_err(|e| BcdError::Schema(format!("{id}\\Description\\Type: {e}")))?;

        let mut object = BcdObject::new(id, description);
        if let Some(elements) = self.hive.find_child(node, ELEMENTS_KEY)? {
            for (element_node, key) in self.hive.read_children(elements)? {
                let raw = self
                    .hive
                    .get_value(element_node, ELEMENT_VALUE)?
                    .ok_or_else(|| {
                        BcdError::Schema(format!("{id}\\Elements\\{key}\\Element does not exist"))
                    })?;
                object.insert(BcdElement::new(key, raw.kind, raw.data));
            }
        }
        debug!(
            "read object {id} ({description}, {} elements)",
            object.elements.len()
        );
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::{HiveAccess, MemoryHive};

    const BOOTMGR_ID: &str = "{9dea862c-5cdd-4e70-acc1-f32b344d4795}";

    fn store() -> BcdStore<MemoryHive> {
        BcdStore::new(MemoryHive::new_bcd())
    }

    #[test]
    fn test_upsert_set_get() {
        let mut store = store();
        let mut object = store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        store
            .set_element(&mut object, "12000004", RegType::Sz, &value::encode_sz("Example"))
            .unwrap();
        assert_eq!(object.element("12000004").unwrap().string().unwrap(), "Example");

        let read = store.get_object("{test}").unwrap();
        assert_eq!(read.description().raw(), 0x1020_0003);
        assert_eq!(read.element("12000004").unwrap().string().unwrap(), "Example");
        assert_eq!(read.element_name("12000004"), "Description");
    }

    #[test]
    fn test_upsert_does_not_load_existing_elements() {
        let mut store = store();
        let description = BcdDescription::from_raw(0x1010_0002);
        let mut object = store.upsert_object(BOOTMGR_ID, description).unwrap();
        store
            .set_element_value(&mut object, "25000004", &ElementValue::Dword(30))
            .unwrap();

        let again = store.upsert_object(BOOTMGR_ID, description).unwrap();
        assert!(again.elements().is_empty());
        let read = store.get_object(BOOTMGR_ID).unwrap();
        assert_eq!(read.element("25000004").unwrap().dword().unwrap(), 30);
    }

    #[test]
    fn test_set_element_replaces() {
        let mut store = store();
        let mut object = store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        store
            .set_element(&mut object, "22000002", RegType::Sz, &value::encode_sz("\\Windows"))
            .unwrap();
        store
            .set_element(&mut object, "22000002", RegType::Binary, &[1, 2])
            .unwrap();
        assert_eq!(object.elements().len(), 1);

        let read = store.get_object("{test}").unwrap();
        let element = read.element("22000002").unwrap();
        assert_eq!(element.kind(), RegType::Binary);
        assert_eq!(element.raw(), &[1, 2]);
    }

    #[test]
    fn test_set_element_key_case_reuses_element() {
        let mut store = store();
        let mut object = store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        store
            .set_element_value(&mut object, "260000a0", &ElementValue::Raw(RegType::Binary, vec![0]))
            .unwrap();
        store
            .set_element_value(&mut object, "260000A0", &ElementValue::Raw(RegType::Binary, vec![1]))
            .unwrap();

        let keys: Vec<&String> = object.elements().keys().collect();
        assert_eq!(keys, ["260000a0"]);
        assert_eq!(object.element("260000a0").unwrap().raw(), &[1]);

        let read = store.get_object("{test}").unwrap();
        assert_eq!(read.elements().len(), 1);
        assert_eq!(read, object);
    }

    #[test]
    fn test_set_element_rejects_bad_key() {
        let mut store = store();
        let mut object = store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        let err = store
            .set_element(&mut object, "Description", RegType::Sz, &[0, 0])
            .unwrap_err();
        assert!(matches!(err, BcdError::InvalidElementKey(_)));
    }

    #[test]
    fn test_set_element_on_missing_object() {
        let mut store = store();
        let mut ghost = BcdObject::new("{ghost}", BcdDescription::from_raw(0x1020_0003));
        let err = store
            .set_element(&mut ghost, "12000004", RegType::Sz, &[0, 0])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_object_not_found() {
        let store = store();
        assert!(store.get_object("{missing}").unwrap_err().is_not_found());
    }

    #[test]
    fn test_object_without_elements_key() {
        let mut store = store();
        let hive = store.hive_mut();
        let objects = hive.objects_root().unwrap();
        let node = hive.upsert_child(objects, "{bare}").unwrap();
        let description = hive.upsert_child(node, DESCRIPTION_KEY).unwrap();
        hive.set_value(description, TYPE_VALUE, RegType::Dword, &0x3000_0000u32.to_le_bytes())
            .unwrap();

        let mut object = store.get_object("{bare}").unwrap();
        assert!(object.elements().is_empty());
        store
            .set_element(&mut object, "35000001", RegType::Qword, &value::encode_qword(4096))
            .unwrap();
        let read = store.get_object("{bare}").unwrap();
        assert_eq!(read.element("35000001").unwrap().qword().unwrap(), 4096);
        assert_eq!(read.element_name("35000001"), "RamdiskImageOffset");
    }

    #[test]
    fn test_enumerate_aborts_on_schema_error() {
        let mut store = store();
        store
            .upsert_object(BOOTMGR_ID, BcdDescription::from_raw(0x1010_0002))
            .unwrap();
        let hive = store.hive_mut();
        let objects = hive.objects_root().unwrap();
        let broken = hive.upsert_child(objects, "{broken}").unwrap();
        hive.upsert_child(broken, DESCRIPTION_KEY).unwrap();

        let err = store.enumerate(&ObjectFilter::All).unwrap_err();
        assert!(err.is_schema());

        // Filtering by id skips the broken object before it is read
        let only = store.enumerate(&ObjectFilter::parse(BOOTMGR_ID)).unwrap();
        assert_eq!(only.len(), 1);
        assert!(only.contains_key(BOOTMGR_ID));
    }

    #[test]
    fn test_type_value_checks() {
        let mut store = store();
        store
            .upsert_object("{obj}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        let hive = store.hive_mut();
        let objects = hive.objects_root().unwrap();
        let node = hive.find_child(objects, "{obj}").unwrap().unwrap();
        let description = hive.find_child(node, DESCRIPTION_KEY).unwrap().unwrap();

        hive.set_value(description, TYPE_VALUE, RegType::Sz, &[0, 0]).unwrap();
        assert!(store.get_object("{obj}").unwrap_err().is_schema());

        let hive = store.hive_mut();
        hive.set_value(description, TYPE_VALUE, RegType::Dword, &[1, 2]).unwrap();
        assert!(store.get_object("{obj}").unwrap_err().is_schema());

        let hive = store.hive_mut();
        hive.delete_value(description, TYPE_VALUE).unwrap();
        assert!(store.get_object("{obj}").unwrap_err().is_schema());
    }

    #[test]
    fn test_element_without_value_is_schema_error() {
        let mut store = store();
        store
            .upsert_object("{obj}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        let hive = store.hive_mut();
        let objects = hive.objects_root().unwrap();
        let node = hive.find_child(objects, "{obj}").unwrap().unwrap();
        let elements = hive.find_child(node, ELEMENTS_KEY).unwrap().unwrap();
        hive.upsert_child(elements, "12000004").unwrap();
        assert!(store.get_object("{obj}").unwrap_err().is_schema());
    }

    #[test]
    fn test_enumerate_all() {
        let mut store = store();
        store
            .upsert_object(BOOTMGR_ID, BcdDescription::from_raw(0x1010_0002))
            .unwrap();
        store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        let all = store.enumerate(&ObjectFilter::parse("all")).unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.enumerate(&ObjectFilter::parse("{nope}")).unwrap().is_empty());
    }

    #[test]
    fn test_typed_access_kind_mismatch() {
        let element = BcdElement::new("25000004", RegType::Dword, vec![30, 0, 0, 0]);
        assert_eq!(element.dword().unwrap(), 30);
        assert!(matches!(
            element.string(),
            Err(BcdError::KindMismatch { expected: RegType::Sz, actual: RegType::Dword })
        ));
        assert!(matches!(element.qword(), Err(BcdError::KindMismatch { .. })));
        assert!(matches!(element.multi_string(), Err(BcdError::KindMismatch { .. })));
        assert_eq!(element.value().unwrap(), ElementValue::Dword(30));
    }

    #[test]
    fn test_element_display() {
        let sz = BcdElement::new("12000004", RegType::Sz, value::encode_sz("Windows"));
        assert_eq!(sz.to_string(), "Windows");
        let list = BcdElement::new("24000001", RegType::MultiSz, value::encode_multi_sz(&["a", "b"]));
        assert_eq!(list.to_string(), "a\nb");
        let raw = BcdElement::new("16000009", RegType::Binary, vec![0x01, 0xff]);
        assert_eq!(raw.to_string(), "Type=RegBinary, Raw=01ff");
        let bad = BcdElement::new("12000004", RegType::Sz, vec![0x41]);
        assert!(bad.to_string().starts_with("ERROR: "));
    }

    #[test]
    fn test_close_read_only_skips_commit() {
        let image = MemoryHive::new_bcd().to_image();
        let hive = MemoryHive::from_image(&image, HiveAccess::READ).unwrap();
        BcdStore::new(hive).close().unwrap();
    }

    #[test]
    fn test_close_commits_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BCD");
        let mut store = BcdStore::new(MemoryHive::create(&path).unwrap());
        let mut object = store
            .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
            .unwrap();
        store
            .set_element(&mut object, "12000004", RegType::Sz, &value::encode_sz("Example"))
            .unwrap();
        store.close().unwrap();

        let reopened = BcdStore::new(MemoryHive::open(&path, HiveAccess::READ).unwrap());
        let read = reopened.get_object("{test}").unwrap();
        assert_eq!(read.element("12000004").unwrap().string().unwrap(), "Example");
    }
}
