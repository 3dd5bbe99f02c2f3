//! BCD Store Library
//!
//! Reads and edits Boot Configuration Data stores: registry hives holding
//! boot objects (boot manager, OS loaders, inheritable settings, devices)
//! and their typed elements.
//!
//! # Architecture Overview
//!
//! - **value** - Registry value types and the UTF-16LE / integer codecs
//! - **description** - Packed object classification (type, subtype, application)
//! - **element_types** - Catalog of known element codes per object kind
//! - **known_ids** - Well-known object identifiers and their aliases
//! - **hive** - Hierarchical key/value store contract and the in-memory hive
//! - **object** - Objects, elements and the `BcdStore` read/write API
//! - **export** - Serializable exchange representation
//!
//! # Example
//!
//! ```
//! use bcd::{BcdDescription, BcdStore, MemoryHive, ObjectFilter, RegType};
//!
//! let mut store = BcdStore::new(MemoryHive::new_bcd());
//! let mut object = store
//!     .upsert_object("{test}", BcdDescription::from_raw(0x1020_0003))
//!     .unwrap();
//! store
//!     .set_element(&mut object, "12000004", RegType::Sz, &bcd::value::encode_sz("Example"))
//!     .unwrap();
//! let objects = store.enumerate(&ObjectFilter::All).unwrap();
//! assert_eq!(objects["{test}"].element("12000004").unwrap().string().unwrap(), "Example");
//! ```

pub mod description;
pub mod element_types;
pub mod error;
pub mod export;
pub mod hive;
pub mod known_ids;
pub mod object;
pub mod value;

#[cfg(test)]
mod tests_prop;

pub use description::{
    ApplicationSubType, ApplicationType, BcdDescription, InheritSubType, ObjectSubType, ObjectType,
};
pub use element_types::{BcdElementMeta, ElementFormat};
pub use error::{BcdError, Result};
pub use export::{ElementExport, EnumerateResponse, ObjectExport};
pub use hive::{HiveAccess, HiveStore, MemoryHive, RawValue};
pub use object::{BcdElement, BcdObject, BcdStore, ObjectFilter};
pub use value::{ElementValue, RegType};
