//! Value type inference through the store's typed getters.
//!
//! The host store has no type introspection, so each getter is called with a default
//! that realistic values never take. Getting the default back means "absent or another
//! type". Two corners follow from that and are reserved:
//!
//! - a String equal to [`STRING_SENTINEL`] reads as Int or Float;
//! - an Int equal to [`INT_SENTINEL`] (`i32::MIN`) reads as Float.
//!
//! String is probed first, so a key that was ever written as a String wins over a
//! numeric value stored under the same name.

use serde::{Deserialize, Serialize};

use crate::model::{render_float, render_int, ValueType};
use crate::store::PreferenceStore;

pub const STRING_SENTINEL: &str = "__PlayerPrefsViewer_NotFound__";
pub const INT_SENTINEL: i32 = i32::MIN;
pub const FLOAT_DEFAULT: f32 = 0.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStrategy {
    #[default]
    Sentinel,
    /// Reads the backing store's own type tag, falling back to `Sentinel` when the
    /// store keeps none.
    NativeTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub value_type: ValueType,
    pub rendered: String,
}

impl Probe {
    pub fn unknown() -> Self {
        Self {
            value_type: ValueType::Unknown,
            rendered: String::new(),
        }
    }

    fn of(value_type: ValueType, rendered: String) -> Self {
        Self {
            value_type,
            rendered,
        }
    }
}

pub fn probe<S>(store: &S, raw_key: &str, strategy: ProbeStrategy) -> Probe
where
    S: PreferenceStore + ?Sized,
{
    match strategy {
        ProbeStrategy::Sentinel => probe_with_sentinels(store, raw_key),
        ProbeStrategy::NativeTag => match probe_with_native_tag(store, raw_key) {
            Some(found) => found,
            None => probe_with_sentinels(store, raw_key),
        },
    }
}

pub fn probe_with_sentinels<S>(store: &S, raw_key: &str) -> Probe
where
    S: PreferenceStore + ?Sized,
{
    if let Ok(value) = store.get_string(raw_key, STRING_SENTINEL) {
        if value != STRING_SENTINEL {
            return Probe::of(ValueType::String, value);
        }
    }

    if let Ok(value) = store.get_int(raw_key, INT_SENTINEL) {
        if value != INT_SENTINEL {
            return Probe::of(ValueType::Int, render_int(value));
        }
    }

    match store.get_float(raw_key, FLOAT_DEFAULT) {
        Ok(value) => Probe::of(ValueType::Float, render_float(value)),
        Err(_) => Probe::unknown(),
    }
}

fn probe_with_native_tag<S>(store: &S, raw_key: &str) -> Option<Probe>
where
    S: PreferenceStore + ?Sized,
{
    let value_type = store.native_type(raw_key).ok()??;
    let rendered = match value_type {
        ValueType::String => store.get_string(raw_key, "").ok()?,
        ValueType::Int => render_int(store.get_int(raw_key, 0).ok()?),
        ValueType::Float => render_float(store.get_float(raw_key, FLOAT_DEFAULT).ok()?),
        ValueType::Unknown => return None,
    };
    Some(Probe::of(value_type, rendered))
}
