//! In-Memory Hive
//!
//! Keys live in a pool indexed by [`KeyHandle`]; each key records its parent,
//! its subkeys and its values. The hive tracks the rights it was opened with
//! and whether it holds changes that have not been committed yet.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use super::image::{HiveImage, KeyImage, ValueImage};
use super::key::{KeyHandle, KeyNode, KeyValue};
use super::{HiveAccess, HiveStore, RawValue, DESCRIPTION_KEY, OBJECTS_KEY};
use crate::error::{BcdError, Result};
use crate::value::RegType;

/// Hive-level name of an empty BCD store
pub const BCD_KEY_NAME: &str = "BCD00000000";

bitflags::bitflags! {
    /// Hive state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HiveFlags: u32 {
        /// Hive holds uncommitted changes
        const DIRTY = 0x0004;
        /// Hive is read-only
        const READONLY = 0x0008;
    }
}

/// Registry hive held in memory
#[derive(Debug, Clone)]
pub struct MemoryHive {
    /// Key pool
    keys: Vec<KeyNode>,
    /// Root key
    root: KeyHandle,
    /// Rights the hive was opened with
    access: HiveAccess,
    /// State flags
    flags: HiveFlags,
    /// Backing image file, if any
    path: Option<PathBuf>,
}

impl MemoryHive {
    /// Create an empty hive with only a root key
    pub fn new(access: HiveAccess) -> Self {
        let mut flags = HiveFlags::empty();
        if !access.intersects(HiveAccess::WRITE) {
            flags |= HiveFlags::READONLY;
        }
        Self {
            keys: vec![KeyNode::new("", None)],
            root: KeyHandle::new(0),
            access,
            flags,
            path: None,
        }
    }

    /// Create the layout of an empty BCD store
    pub fn new_bcd() -> Self {
        let mut hive = Self::new(HiveAccess::ALL_ACCESS);
        let root = hive.root;
        let description = hive.allocate_key(root, DESCRIPTION_KEY);
        hive.keys[description.index() as usize]
            .set_value(KeyValue::new_string("KeyName", BCD_KEY_NAME));
        hive.allocate_key(root, OBJECTS_KEY);
        hive
    }

    /// Create a new store image at `path`, replacing any existing file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut hive = Self::new_bcd();
        hive.path = Some(path.as_ref().to_path_buf());
        hive.flags |= HiveFlags::DIRTY;
        hive.commit()?;
        Ok(hive)
    }

    /// Load a store image from `path`
    pub fn open(path: impl AsRef<Path>, access: HiveAccess) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let image: HiveImage = serde_json::from_str(&text)?;
        let mut hive = Self::from_image(&image, access)?;
        hive.path = Some(path.to_path_buf());
        debug!(
            "opened hive {} ({} keys, access {:?})",
            path.display(),
            hive.keys.len(),
            access
        );
        Ok(hive)
    }

    /// Build a hive from a parsed image
    pub fn from_image(image: &HiveImage, access: HiveAccess) -> Result<Self> {
        if !image.is_supported() {
            return Err(BcdError::Schema(format!(
                "unsupported hive image {} version {}",
                image.format, image.version
            )));
        }
        let mut hive = Self::new(access);
        hive.keys[0].name = image.root.name.clone();
        let root = hive.root;
        hive.load_key(root, &image.root);
        Ok(hive)
    }

    fn load_key(&mut self, handle: KeyHandle, image: &KeyImage) {
        for value in &image.values {
            self.keys[handle.index() as usize]
                .set_value(KeyValue::new(&value.name, value.kind, &value.data));
        }
        for sub in &image.subkeys {
            let child = self.allocate_key(handle, &sub.name);
            self.load_key(child, sub);
        }
    }

    /// Snapshot the hive as an image
    pub fn to_image(&self) -> HiveImage {
        HiveImage::new(self.save_key(self.root))
    }

    fn save_key(&self, handle: KeyHandle) -> KeyImage {
        let node = &self.keys[handle.index() as usize];
        KeyImage {
            name: node.name.clone(),
            values: node
                .values
                .iter()
                .map(|v| ValueImage {
                    name: v.name.clone(),
                    kind: v.value_type,
                    data: v.data.clone(),
                })
                .collect(),
            subkeys: node.subkeys.iter().map(|&k| self.save_key(k)).collect(),
        }
    }

    /// Root key of the hive
    pub fn root(&self) -> KeyHandle {
        self.root
    }

    pub fn access(&self) -> HiveAccess {
        self.access
    }

    /// True if the hive holds uncommitted changes
    pub fn is_dirty(&self) -> bool {
        self.flags.contains(HiveFlags::DIRTY)
    }

    /// Backing image file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a key node
    pub fn key(&self, handle: KeyHandle) -> Result<&KeyNode> {
        self.keys
            .get(handle.index() as usize)
            .ok_or_else(|| BcdError::NotFound(format!("key handle {}", handle.index())))
    }

    fn key_mut(&mut self, handle: KeyHandle) -> Result<&mut KeyNode> {
        self.keys
            .get_mut(handle.index() as usize)
            .ok_or_else(|| BcdError::NotFound(format!("key handle {}", handle.index())))
    }

    /// Full path of a key, for messages
    pub fn key_path(&self, handle: KeyHandle) -> String {
        let mut parts = Vec::new();
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.keys.get(h.index() as usize) {
                Some(node) => {
                    if !node.name.is_empty() {
                        parts.push(node.name.as_str());
                    }
                    current = node.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        parts.join("\\")
    }

    /// Remove a value; returns false if it did not exist
    pub fn delete_value(&mut self, key: KeyHandle, name: &str) -> Result<bool> {
        self.require(HiveAccess::SET_VALUE, "delete value")?;
        let removed = self.key_mut(key)?.remove_value(name);
        if removed {
            self.flags |= HiveFlags::DIRTY;
        }
        Ok(removed)
    }

    fn require(&self, rights: HiveAccess, operation: &str) -> Result<()> {
        if self.access.contains(rights) {
            Ok(())
        } else {
            Err(BcdError::AccessDenied(format!(
                "{operation} requires {rights:?}, hive opened with {:?}",
                self.access
            )))
        }
    }

    fn allocate_key(&mut self, parent: KeyHandle, name: &str) -> KeyHandle {
        let handle = KeyHandle::new(self.keys.len() as u32);
        self.keys.push(KeyNode::new(name, Some(parent)));
        self.keys[parent.index() as usize].subkeys.push(handle);
        handle
    }

    fn write_image(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.to_image())?;
        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, text)?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }
}

impl HiveStore for MemoryHive {
    type Key = KeyHandle;

    fn objects_root(&self) -> Result<KeyHandle> {
        self.find_child(self.root, OBJECTS_KEY)?
            .ok_or_else(|| BcdError::NotFound(OBJECTS_KEY.to_string()))
    }

    fn find_child(&self, parent: KeyHandle, name: &str) -> Result<Option<KeyHandle>> {
        let node = self.key(parent)?;
        Ok(node
            .subkeys
            .iter()
            .copied()
            .find(|&k| self.keys[k.index() as usize].name_equals(name)))
    }

    fn upsert_child(&mut self, parent: KeyHandle, name: &str) -> Result<KeyHandle> {
        if let Some(existing) = self.find_child(parent, name)? {
            return Ok(existing);
        }
        self.require(HiveAccess::CREATE_SUB_KEY, "create key")?;
        let handle = self.allocate_key(parent, name);
        self.flags |= HiveFlags::DIRTY;
        trace!("created key {}", self.key_path(handle));
        Ok(handle)
    }

    fn read_children(&self, parent: KeyHandle) -> Result<Vec<(KeyHandle, String)>> {
        let node = self.key(parent)?;
        Ok(node
            .subkeys
            .iter()
            .map(|&k| (k, self.keys[k.index() as usize].name.clone()))
            .collect())
    }

    fn get_value(&self, key: KeyHandle, name: &str) -> Result<Option<RawValue>> {
        Ok(self
            .key(key)?
            .find_value(name)
            .map(|v| RawValue::new(v.value_type, v.data.clone())))
    }

    fn set_value(&mut self, key: KeyHandle, name: &str, kind: RegType, data: &[u8]) -> Result<()> {
        self.require(HiveAccess::SET_VALUE, "set value")?;
        self.key_mut(key)?.set_value(KeyValue::new(name, kind, data));
        self.flags |= HiveFlags::DIRTY;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.require(HiveAccess::SET_VALUE, "commit")?;
        if let Some(path) = &self.path {
            self.write_image(path)?;
            debug!("committed hive {}", path.display());
        }
        self.flags.remove(HiveFlags::DIRTY);
        Ok(())
    }

    fn is_writable(&self) -> bool {
        !self.flags.contains(HiveFlags::READONLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_template_layout() {
        let hive = MemoryHive::new_bcd();
        let objects = hive.objects_root().unwrap();
        assert_eq!(hive.key(objects).unwrap().name, "Objects");
        assert!(hive.read_children(objects).unwrap().is_empty());

        let description = hive.find_child(hive.root(), "description").unwrap().unwrap();
        let name = hive.get_value(description, "KeyName").unwrap().unwrap();
        assert_eq!(name.kind, RegType::Sz);
        assert_eq!(name.data, crate::value::encode_sz(BCD_KEY_NAME));
    }

    #[test]
    fn test_upsert_child_reuses() {
        let mut hive = MemoryHive::new_bcd();
        let objects = hive.objects_root().unwrap();
        let a = hive.upsert_child(objects, "{test}").unwrap();
        let b = hive.upsert_child(objects, "{TEST}").unwrap();
        assert_eq!(a, b);
        assert_eq!(hive.read_children(objects).unwrap(), vec![(a, "{test}".to_string())]);
        assert_eq!(hive.key_path(a), "Objects\\{test}");
    }

    #[test]
    fn test_set_value_marks_dirty() {
        let mut hive = MemoryHive::new(HiveAccess::ALL_ACCESS);
        assert!(!hive.is_dirty());
        let root = hive.root();
        hive.set_value(root, "Type", RegType::Dword, &[1, 0, 0, 0]).unwrap();
        assert!(hive.is_dirty());
        hive.commit().unwrap();
        assert!(!hive.is_dirty());
    }

    #[test]
    fn test_read_only_rejects_mutation() {
        let mut hive = MemoryHive::from_image(&MemoryHive::new_bcd().to_image(), HiveAccess::READ)
            .unwrap();
        assert!(!hive.is_writable());
        let objects = hive.objects_root().unwrap();
        let err = hive.upsert_child(objects, "{x}").unwrap_err();
        assert!(matches!(err, BcdError::AccessDenied(_)));
        let err = hive.set_value(objects, "v", RegType::None, &[]).unwrap_err();
        assert!(matches!(err, BcdError::AccessDenied(_)));
        assert!(matches!(hive.commit(), Err(BcdError::AccessDenied(_))));
    }

    #[test]
    fn test_missing_objects_root() {
        let hive = MemoryHive::new(HiveAccess::READ);
        assert!(hive.objects_root().unwrap_err().is_not_found());
    }

    #[test]
    fn test_image_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BCD");

        let mut hive = MemoryHive::create(&path).unwrap();
        let objects = hive.objects_root().unwrap();
        let object = hive.upsert_child(objects, "{test}").unwrap();
        hive.set_value(object, "Type", RegType::Dword, &[2, 0, 0x10, 0x10]).unwrap();
        hive.commit().unwrap();

        let reopened = MemoryHive::open(&path, HiveAccess::READ).unwrap();
        let objects = reopened.objects_root().unwrap();
        let object = reopened.find_child(objects, "{test}").unwrap().unwrap();
        let value = reopened.get_value(object, "type").unwrap().unwrap();
        assert_eq!(value, RawValue::new(RegType::Dword, vec![2, 0, 0x10, 0x10]));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_commit_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail
        let path = dir.path().join("BCD");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let mut hive = MemoryHive::new_bcd();
        hive.path = Some(path.clone());
        assert!(matches!(hive.commit(), Err(BcdError::Io(_))));
        assert!(!dir.path().join("BCD.tmp").exists());
    }

    #[test]
    fn test_open_rejects_foreign_image() {
        let mut image = MemoryHive::new_bcd().to_image();
        image.version = 99;
        let err = MemoryHive::from_image(&image, HiveAccess::READ).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_delete_value() {
        let mut hive = MemoryHive::new_bcd();
        let description = hive.find_child(hive.root(), DESCRIPTION_KEY).unwrap().unwrap();
        assert!(hive.delete_value(description, "KeyName").unwrap());
        assert!(hive.get_value(description, "KeyName").unwrap().is_none());
    }
}
