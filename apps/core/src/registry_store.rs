//! Preference store backed by the user registry hive.
//!
//! Layout written by the engine under `HKEY_CURRENT_USER\<subkey>`:
//!
//! - integers: `REG_DWORD`;
//! - floats: an 8-byte double, tagged `REG_QWORD` or `REG_DWORD`;
//! - strings: `REG_BINARY` holding NUL-terminated UTF-8 (`REG_SZ` is read too).
//!
//! The engine names each value `<key>_h<hash>`. Reads and deletes try the name as given
//! first and then the hashed name; writes always use the hashed name.

use crate::model::ValueType;
use crate::store::{PreferenceStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStore {
    subkey: String,
}

impl RegistryStore {
    pub fn new(subkey: &str) -> Self {
        Self {
            subkey: subkey.to_string(),
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(&cfg.registry_subkey())
    }

    pub fn subkey(&self) -> &str {
        &self.subkey
    }
}

/// Value name the engine stores `key` under.
pub fn hashed_value_name(key: &str) -> String {
    format!("{key}_h{}", key_hash(key))
}

// djb2 with xor, over the UTF-8 bytes of the key.
fn key_hash(key: &str) -> u32 {
    key.bytes()
        .fold(5381_u32, |hash, byte| hash.wrapping_mul(33) ^ u32::from(byte))
}

#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
enum RegValue {
    Int(i32),
    Float(f32),
    Text(String),
    Other,
}

impl RegValue {
    #[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
    fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Int(_) => Some(ValueType::Int),
            Self::Float(_) => Some(ValueType::Float),
            Self::Text(_) => Some(ValueType::String),
            Self::Other => None,
        }
    }
}

// Registry value type tags.
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
const REG_SZ_TAG: u32 = 1;
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
const REG_BINARY_TAG: u32 = 3;
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
const REG_DWORD_TAG: u32 = 4;
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
const REG_QWORD_TAG: u32 = 11;

#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
fn decode_value(value_type: u32, data: &[u8]) -> RegValue {
    match (value_type, data.len()) {
        (REG_DWORD_TAG, 4) => {
            RegValue::Int(i32::from_le_bytes([data[0], data[1], data[2], data[3]]))
        }
        (REG_DWORD_TAG | REG_QWORD_TAG, 8) => {
            let mut bytes = [0_u8; 8];
            bytes.copy_from_slice(data);
            RegValue::Float(f64::from_le_bytes(bytes) as f32)
        }
        (REG_BINARY_TAG, _) => {
            let trimmed = data.strip_suffix(&[0]).unwrap_or(data);
            RegValue::Text(String::from_utf8_lossy(trimmed).into_owned())
        }
        (REG_SZ_TAG, _) => {
            let mut wide: Vec<u16> = data
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                .collect();
            while wide.last().copied() == Some(0) {
                wide.pop();
            }
            RegValue::Text(String::from_utf16_lossy(&wide))
        }
        _ => RegValue::Other,
    }
}

#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
fn encode_text(value: &str) -> Vec<u8> {
    value.bytes().chain(std::iter::once(0)).collect()
}

#[cfg(target_os = "windows")]
impl RegistryStore {
    fn read(&self, key: &str) -> Result<Option<RegValue>, StoreError> {
        let Some(handle) = win::open(&self.subkey, false)? else {
            return Ok(None);
        };
        let mut found = win::query_value(&handle, key)?;
        if found.is_none() {
            found = win::query_value(&handle, &hashed_value_name(key))?;
        }
        Ok(found.map(|(value_type, data)| decode_value(value_type, &data)))
    }

    fn write(&self, key: &str, value_type: u32, data: &[u8]) -> Result<(), StoreError> {
        let handle = win::create(&self.subkey)?;
        win::set_value(&handle, &hashed_value_name(key), value_type, data)
    }
}

#[cfg(target_os = "windows")]
impl PreferenceStore for RegistryStore {
    fn list_raw_names(&self) -> Result<Vec<String>, StoreError> {
        match win::open(&self.subkey, false)? {
            Some(handle) => win::value_names(&handle),
            None => Ok(Vec::new()),
        }
    }

    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError> {
        match self.read(key)? {
            Some(RegValue::Text(value)) => Ok(value),
            _ => Ok(default.to_string()),
        }
    }

    fn get_int(&self, key: &str, default: i32) -> Result<i32, StoreError> {
        match self.read(key)? {
            Some(RegValue::Int(value)) => Ok(value),
            _ => Ok(default),
        }
    }

    fn get_float(&self, key: &str, default: f32) -> Result<f32, StoreError> {
        match self.read(key)? {
            Some(RegValue::Float(value)) => Ok(value),
            _ => Ok(default),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, REG_BINARY_TAG, &encode_text(value))
    }

    fn set_int(&mut self, key: &str, value: i32) -> Result<(), StoreError> {
        self.write(key, REG_DWORD_TAG, &value.to_le_bytes())
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<(), StoreError> {
        self.write(key, REG_DWORD_TAG, &f64::from(value).to_le_bytes())
    }

    fn delete_key(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(handle) = win::open(&self.subkey, true)? else {
            return Ok(());
        };
        if !win::delete_value(&handle, key)? {
            win::delete_value(&handle, &hashed_value_name(key))?;
        }
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        let Some(handle) = win::open(&self.subkey, true)? else {
            return Ok(());
        };
        for name in win::value_names(&handle)? {
            win::delete_value(&handle, &name)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        match win::open(&self.subkey, true)? {
            Some(handle) => win::flush(&handle),
            None => Ok(()),
        }
    }

    fn native_type(&self, key: &str) -> Result<Option<ValueType>, StoreError> {
        Ok(self.read(key)?.and_then(|value| value.value_type()))
    }
}

#[cfg(not(target_os = "windows"))]
impl PreferenceStore for RegistryStore {
    fn list_raw_names(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::EnumerationUnsupported)
    }

    fn get_string(&self, _key: &str, _default: &str) -> Result<String, StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn get_int(&self, _key: &str, _default: i32) -> Result<i32, StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn get_float(&self, _key: &str, _default: f32) -> Result<f32, StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn set_string(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn set_int(&mut self, _key: &str, _value: i32) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn set_float(&mut self, _key: &str, _value: f32) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn delete_key(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Err(StoreError::UnsupportedPlatform)
    }
}

#[cfg(target_os = "windows")]
mod win {
    use windows_sys::Win32::Foundation::{
        ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS,
    };
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegEnumValueW, RegFlushKey,
        RegOpenKeyExW, RegQueryInfoKeyW, RegQueryValueExW, RegSetValueExW, HKEY,
        HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_READ, KEY_SET_VALUE,
    };

    use crate::store::StoreError;

    pub(super) struct KeyHandle {
        hkey: HKEY,
        subkey: String,
    }

    impl Drop for KeyHandle {
        fn drop(&mut self) {
            unsafe {
                RegCloseKey(self.hkey);
            }
        }
    }

    pub(super) fn open(subkey: &str, writable: bool) -> Result<Option<KeyHandle>, StoreError> {
        let access = if writable {
            KEY_READ | KEY_SET_VALUE
        } else {
            KEY_READ
        };
        let subkey_wide = to_wide(subkey);
        let mut hkey: HKEY = std::ptr::null_mut();
        let status =
            unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, subkey_wide.as_ptr(), 0, access, &mut hkey) };

        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(registry_error(subkey, "open key", status));
        }
        Ok(Some(KeyHandle {
            hkey,
            subkey: subkey.to_string(),
        }))
    }

    pub(super) fn create(subkey: &str) -> Result<KeyHandle, StoreError> {
        let subkey_wide = to_wide(subkey);
        let mut hkey: HKEY = std::ptr::null_mut();
        let status = unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                subkey_wide.as_ptr(),
                0,
                std::ptr::null(),
                0,
                KEY_SET_VALUE | KEY_QUERY_VALUE,
                std::ptr::null(),
                &mut hkey,
                std::ptr::null_mut(),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(registry_error(subkey, "create/open key", status));
        }
        Ok(KeyHandle {
            hkey,
            subkey: subkey.to_string(),
        })
    }

    pub(super) fn value_names(handle: &KeyHandle) -> Result<Vec<String>, StoreError> {
        let mut value_count = 0_u32;
        let mut max_name_len = 0_u32;
        let info_status = unsafe {
            RegQueryInfoKeyW(
                handle.hkey,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut value_count,
                &mut max_name_len,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if info_status != ERROR_SUCCESS {
            return Err(registry_error(&handle.subkey, "inspect key", info_status));
        }

        let mut names = Vec::with_capacity(value_count as usize);
        let mut name_buffer = vec![0_u16; max_name_len as usize + 2];
        for index in 0..value_count {
            let mut name_len = max_name_len + 1;
            let enum_status = unsafe {
                RegEnumValueW(
                    handle.hkey,
                    index,
                    name_buffer.as_mut_ptr(),
                    &mut name_len,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                )
            };

            if enum_status == ERROR_NO_MORE_ITEMS {
                break;
            }
            if enum_status != ERROR_SUCCESS {
                continue;
            }
            names.push(String::from_utf16_lossy(&name_buffer[..name_len as usize]));
        }
        Ok(names)
    }

    pub(super) fn query_value(
        handle: &KeyHandle,
        value_name: &str,
    ) -> Result<Option<(u32, Vec<u8>)>, StoreError> {
        let name_wide = to_wide(value_name);
        let mut value_type = 0_u32;
        let mut size = 0_u32;
        let status = unsafe {
            RegQueryValueExW(
                handle.hkey,
                name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                std::ptr::null_mut(),
                &mut size,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS && status != ERROR_MORE_DATA {
            return Err(registry_error(value_name, "query value size", status));
        }

        let mut buffer = vec![0_u8; size as usize];
        let status = unsafe {
            RegQueryValueExW(
                handle.hkey,
                name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                buffer.as_mut_ptr(),
                &mut size,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(registry_error(value_name, "read value", status));
        }
        buffer.truncate(size as usize);
        Ok(Some((value_type, buffer)))
    }

    pub(super) fn set_value(
        handle: &KeyHandle,
        value_name: &str,
        value_type: u32,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let name_wide = to_wide(value_name);
        let status = unsafe {
            RegSetValueExW(
                handle.hkey,
                name_wide.as_ptr(),
                0,
                value_type,
                data.as_ptr(),
                data.len() as u32,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(registry_error(value_name, "set value", status));
        }
        Ok(())
    }

    /// Returns whether a value was removed.
    pub(super) fn delete_value(handle: &KeyHandle, value_name: &str) -> Result<bool, StoreError> {
        let name_wide = to_wide(value_name);
        let status = unsafe { RegDeleteValueW(handle.hkey, name_wide.as_ptr()) };
        if status == ERROR_SUCCESS {
            return Ok(true);
        }
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(false);
        }
        Err(registry_error(value_name, "delete value", status))
    }

    pub(super) fn flush(handle: &KeyHandle) -> Result<(), StoreError> {
        let status = unsafe { RegFlushKey(handle.hkey) };
        if status != ERROR_SUCCESS {
            return Err(registry_error(&handle.subkey, "flush key", status));
        }
        Ok(())
    }

    fn to_wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn registry_error(key: &str, action: &str, status: u32) -> StoreError {
        StoreError::access(key, format!("{action} failed with code {status}"))
    }
}
