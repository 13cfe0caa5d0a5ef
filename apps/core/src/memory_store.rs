use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{TypedValue, ValueType};
use crate::store::{PreferenceStore, StoreError};

/// Preference store held in memory, enumerated in insertion order.
///
/// Keys are stored exactly as given, so hash-suffixed names can be seeded directly.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    values: IndexMap<String, TypedValue>,
    enumeration_supported: bool,
    unreadable: HashSet<String>,
    flush_count: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            values: IndexMap::new(),
            enumeration_supported: true,
            unreadable: HashSet::new(),
            flush_count: 0,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: TypedValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn without_enumeration(mut self) -> Self {
        self.set_enumeration_supported(false);
        self
    }

    pub fn set_enumeration_supported(&mut self, supported: bool) {
        self.enumeration_supported = supported;
    }

    /// Makes every typed get on `key` fail with an access error.
    pub fn fail_reads_for(mut self, key: &str) -> Self {
        self.unreadable.insert(key.to_string());
        self
    }

    pub fn insert(&mut self, key: &str, value: TypedValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    fn read(&self, key: &str) -> Result<Option<&TypedValue>, StoreError> {
        if self.unreadable.contains(key) {
            return Err(StoreError::access(key, "read failed"));
        }
        Ok(self.values.get(key))
    }
}

impl PreferenceStore for MemoryStore {
    fn list_raw_names(&self) -> Result<Vec<String>, StoreError> {
        if !self.enumeration_supported {
            return Err(StoreError::EnumerationUnsupported);
        }
        Ok(self.values.keys().cloned().collect())
    }

    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError> {
        match self.read(key)? {
            Some(TypedValue::String(value)) => Ok(value.clone()),
            _ => Ok(default.to_string()),
        }
    }

    fn get_int(&self, key: &str, default: i32) -> Result<i32, StoreError> {
        match self.read(key)? {
            Some(TypedValue::Int(value)) => Ok(*value),
            _ => Ok(default),
        }
    }

    fn get_float(&self, key: &str, default: f32) -> Result<f32, StoreError> {
        match self.read(key)? {
            Some(TypedValue::Float(value)) => Ok(*value),
            _ => Ok(default),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert(key, TypedValue::String(value.to_string()));
        Ok(())
    }

    fn set_int(&mut self, key: &str, value: i32) -> Result<(), StoreError> {
        self.insert(key, TypedValue::Int(value));
        Ok(())
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<(), StoreError> {
        self.insert(key, TypedValue::Float(value));
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.shift_remove(key);
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        self.values.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flush_count += 1;
        Ok(())
    }

    fn native_type(&self, key: &str) -> Result<Option<ValueType>, StoreError> {
        Ok(self.read(key)?.map(TypedValue::value_type))
    }
}
