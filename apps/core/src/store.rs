use std::fmt::{Display, Formatter};

use crate::model::ValueType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store cannot list its keys on this platform.
    EnumerationUnsupported,
    UnsupportedPlatform,
    Access { key: String, message: String },
}

impl StoreError {
    pub fn access(key: &str, message: impl Into<String>) -> Self {
        Self::Access {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnumerationUnsupported => {
                write!(f, "preference enumeration is not supported on this platform")
            }
            Self::UnsupportedPlatform => write!(f, "unsupported platform"),
            Self::Access { key, message } => write!(f, "failed to access '{key}': {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The host's preference subsystem.
///
/// Typed getters follow the host contract: they return `default` both when the key is
/// absent and when it holds a value of another type. `Err` is reserved for failures of
/// the store itself.
pub trait PreferenceStore {
    fn list_raw_names(&self) -> Result<Vec<String>, StoreError>;

    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError>;
    fn get_int(&self, key: &str, default: i32) -> Result<i32, StoreError>;
    fn get_float(&self, key: &str, default: f32) -> Result<f32, StoreError>;

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn set_int(&mut self, key: &str, value: i32) -> Result<(), StoreError>;
    fn set_float(&mut self, key: &str, value: f32) -> Result<(), StoreError>;

    fn delete_key(&mut self, key: &str) -> Result<(), StoreError>;
    fn delete_all(&mut self) -> Result<(), StoreError>;
    fn flush(&mut self) -> Result<(), StoreError>;

    /// The backing store's own type tag for `key`, when it keeps one.
    fn native_type(&self, _key: &str) -> Result<Option<ValueType>, StoreError> {
        Ok(None)
    }
}
