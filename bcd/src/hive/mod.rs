//! Registry Hive Access
//!
//! A BCD store is a registry hive with a fixed layout:
//!
//! ```text
//! (root)
//! ├── Description
//! │   └── KeyName = "BCD00000000"
//! └── Objects
//!     └── {9dea862c-5cdd-4e70-acc1-f32b344d4795}
//!         ├── Description
//!         │   └── Type = REG_DWORD 0x10100002
//!         └── Elements
//!             └── 12000004
//!                 └── Element = REG_SZ "Windows Boot Manager"
//! ```
//!
//! The object model only needs a handful of tree operations, captured by the
//! [`HiveStore`] trait. [`MemoryHive`] implements it over an in-memory key
//! pool that is persisted as a hive image file.

pub mod image;
pub mod key;
pub mod memory;

use core::fmt;

use crate::error::Result;
use crate::value::RegType;

pub use image::{HiveImage, KeyImage, ValueImage, IMAGE_FORMAT, IMAGE_VERSION};
pub use key::{KeyHandle, KeyNode, KeyValue};
pub use memory::MemoryHive;

/// Name of the key holding every object
pub const OBJECTS_KEY: &str = "Objects";

/// Name of the per-object key holding the description
pub const DESCRIPTION_KEY: &str = "Description";

/// Name of the description value holding the packed type
pub const TYPE_VALUE: &str = "Type";

/// Name of the per-object key holding the elements
pub const ELEMENTS_KEY: &str = "Elements";

/// Name of the value holding an element's payload
pub const ELEMENT_VALUE: &str = "Element";

bitflags::bitflags! {
    /// Access rights a hive was opened with
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HiveAccess: u32 {
        /// Read values
        const QUERY_VALUE = 0x0001;
        /// Write values
        const SET_VALUE = 0x0002;
        /// Create subkeys
        const CREATE_SUB_KEY = 0x0004;
        /// List subkeys
        const ENUMERATE_SUB_KEYS = 0x0008;

        const READ = Self::QUERY_VALUE.bits() | Self::ENUMERATE_SUB_KEYS.bits();
        const WRITE = Self::SET_VALUE.bits() | Self::CREATE_SUB_KEY.bits();
        const ALL_ACCESS = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl HiveAccess {
    /// Rights for a store opened read-only or read-write
    pub fn for_writable(writable: bool) -> Self {
        if writable {
            Self::ALL_ACCESS
        } else {
            Self::READ
        }
    }
}

/// A typed value as stored in the hive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub kind: RegType,
    pub data: Vec<u8>,
}

impl RawValue {
    pub fn new(kind: RegType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }
}

/// Hierarchical key/value store a BCD hive lives in
///
/// Mutations act on the loaded tree and only reach the backing file on
/// [`HiveStore::commit`]. Handles are only meaningful for the store that
/// issued them.
pub trait HiveStore {
    /// Key handle
    type Key: Copy + fmt::Debug;

    /// The `Objects` key under the hive root
    fn objects_root(&self) -> Result<Self::Key>;

    /// Direct child of `parent` named `name`
    fn find_child(&self, parent: Self::Key, name: &str) -> Result<Option<Self::Key>>;

    /// Direct child of `parent` named `name`, created if absent
    fn upsert_child(&mut self, parent: Self::Key, name: &str) -> Result<Self::Key>;

    /// All direct children of `parent` with their names
    fn read_children(&self, parent: Self::Key) -> Result<Vec<(Self::Key, String)>>;

    /// Value `name` of `key`
    fn get_value(&self, key: Self::Key, name: &str) -> Result<Option<RawValue>>;

    /// Create or replace value `name` of `key`
    fn set_value(&mut self, key: Self::Key, name: &str, kind: RegType, data: &[u8]) -> Result<()>;

    /// Persist pending mutations
    fn commit(&mut self) -> Result<()>;

    /// Whether mutations and commit are permitted
    fn is_writable(&self) -> bool;
}
