//! Registry Key Structures
//!
//! Keys are hierarchical containers that hold values and subkeys. Names
//! compare case-insensitively but keep the casing they were created with.

use crate::value::RegType;

/// Key handle (index into the owning hive's key pool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(u32);

impl KeyHandle {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> u32 {
        self.0
    }
}

/// Registry value (name + type + data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Value name
    pub name: String,
    /// Value type
    pub value_type: RegType,
    /// Value data
    pub data: Vec<u8>,
}

impl KeyValue {
    /// Create a new value
    pub fn new(name: &str, value_type: RegType, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            data: data.to_vec(),
        }
    }

    /// Create a string value
    pub fn new_string(name: &str, value: &str) -> Self {
        Self::new(name, RegType::Sz, &crate::value::encode_sz(value))
    }

    /// Create a DWORD value
    pub fn new_dword(name: &str, value: u32) -> Self {
        Self::new(name, RegType::Dword, &value.to_le_bytes())
    }
}

/// Registry key node
#[derive(Debug, Clone)]
pub struct KeyNode {
    /// Key name
    pub name: String,

    /// Parent key (`None` for the hive root)
    pub parent: Option<KeyHandle>,

    /// Subkeys, in creation order
    pub subkeys: Vec<KeyHandle>,

    /// Values, in creation order
    pub values: Vec<KeyValue>,
}

impl KeyNode {
    /// Create a new key with name
    pub fn new(name: &str, parent: Option<KeyHandle>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            subkeys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Compare name (case-insensitive)
    pub fn name_equals(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Find a value by name
    pub fn find_value(&self, name: &str) -> Option<&KeyValue> {
        self.values.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Set or update a value; returns true if an existing value was replaced
    pub fn set_value(&mut self, value: KeyValue) -> bool {
        if let Some(existing) = self
            .values
            .iter_mut()
            .find(|v| v.name.eq_ignore_ascii_case(&value.name))
        {
            existing.value_type = value.value_type;
            existing.data = value.data;
            return true;
        }
        self.values.push(value);
        false
    }

    /// Remove a value by name
    pub fn remove_value(&mut self, name: &str) -> bool {
        let before = self.values.len();
        self.values.retain(|v| !v.name.eq_ignore_ascii_case(name));
        self.values.len() != before
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}
