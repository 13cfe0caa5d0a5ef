use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

use crate::key_normalizer::normalize;
use crate::logging;
use crate::model::{PrefEntry, TypedValue, ValueType};
use crate::prober::{probe, ProbeStrategy};
use crate::store::{PreferenceStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    InvalidValue { value_type: ValueType, text: String },
    EmptyKey,
    UnsupportedType(ValueType),
    Store(StoreError),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                value_type: ValueType::Int,
                ..
            } => write!(f, "The value could not be converted to an integer."),
            Self::InvalidValue {
                value_type: ValueType::Float,
                ..
            } => write!(f, "The value could not be converted to a float."),
            Self::InvalidValue { value_type, text } => {
                write!(f, "'{text}' is not a valid {value_type} value.")
            }
            Self::EmptyKey => write!(f, "key is required"),
            Self::UnsupportedType(value_type) => {
                write!(f, "values of type {value_type} cannot be stored")
            }
            Self::Store(error) => write!(f, "store error: {error}"),
        }
    }
}

impl std::error::Error for IndexError {}

impl From<StoreError> for IndexError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Deduplicated view over a preference store.
///
/// Every refresh rebuilds the view from the store; nothing read from the store is kept
/// across refreshes except the resulting entries. Mutations run to completion and end
/// with a refresh using the last query and mode.
pub struct PreferenceIndex<S> {
    store: S,
    strategy: ProbeStrategy,
    query: String,
    show_raw_keys: bool,
    entries: Vec<PrefEntry>,
    enumeration_supported: bool,
    enumeration_warned: bool,
}

impl<S: PreferenceStore> PreferenceIndex<S> {
    pub fn new(store: S) -> Self {
        Self::with_strategy(store, ProbeStrategy::default())
    }

    pub fn with_strategy(store: S, strategy: ProbeStrategy) -> Self {
        Self {
            store,
            strategy,
            query: String::new(),
            show_raw_keys: false,
            entries: Vec::new(),
            enumeration_supported: true,
            enumeration_warned: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries(&self) -> &[PrefEntry] {
        &self.entries
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// False once the store reported that it cannot enumerate keys.
    pub fn enumeration_supported(&self) -> bool {
        self.enumeration_supported
    }

    pub fn refresh(
        &mut self,
        query: &str,
        show_raw_keys: bool,
    ) -> Result<&[PrefEntry], IndexError> {
        self.query = query.to_string();
        self.show_raw_keys = show_raw_keys;
        self.reload()
    }

    pub fn add(
        &mut self,
        clean: &str,
        value_type: ValueType,
        text: &str,
    ) -> Result<(), IndexError> {
        if clean.is_empty() {
            return Err(IndexError::EmptyKey);
        }
        if value_type == ValueType::Unknown {
            return Err(IndexError::UnsupportedType(value_type));
        }

        self.store_value(clean, value_type, text)?;
        self.reload()?;
        Ok(())
    }

    pub fn delete(&mut self, raw_key: &str) -> Result<(), IndexError> {
        self.store.delete_key(raw_key)?;
        self.store.flush()?;
        self.reload()?;
        Ok(())
    }

    /// Replaces the entry stored under `raw_key` with a value stored under `clean`.
    ///
    /// The old key is deleted before the new text is parsed, so an `InvalidValue`
    /// result leaves the key absent. That error wins over any failure of the follow-up
    /// reload. Editing a hash-suffixed key re-stores it under the
    /// clean name, folding it together with any sibling variants.
    pub fn edit(
        &mut self,
        raw_key: &str,
        clean: &str,
        value_type: ValueType,
        text: &str,
    ) -> Result<(), IndexError> {
        if clean.is_empty() {
            return Err(IndexError::EmptyKey);
        }
        if value_type == ValueType::Unknown {
            return Err(IndexError::UnsupportedType(value_type));
        }

        self.store.delete_key(raw_key)?;
        if let Err(error) = self.store_value(clean, value_type, text) {
            // The delete already happened; the caller still gets the rejection.
            if let Err(flush_error) = self.store.flush() {
                logging::warn(&format!("flush after rejected edit failed: {flush_error}"));
            }
            if let Err(reload_error) = self.reload() {
                logging::warn(&format!("reload after rejected edit failed: {reload_error}"));
            }
            return Err(error);
        }
        self.reload()?;
        Ok(())
    }

    pub fn delete_all(&mut self) -> Result<(), IndexError> {
        self.store.delete_all()?;
        self.store.flush()?;
        self.reload()?;
        Ok(())
    }

    fn store_value(
        &mut self,
        key: &str,
        value_type: ValueType,
        text: &str,
    ) -> Result<(), IndexError> {
        let parsed =
            TypedValue::parse(value_type, text).ok_or_else(|| IndexError::InvalidValue {
                value_type,
                text: text.to_string(),
            })?;

        match &parsed {
            TypedValue::String(value) => self.store.set_string(key, value)?,
            TypedValue::Int(value) => self.store.set_int(key, *value)?,
            TypedValue::Float(value) => self.store.set_float(key, *value)?,
        }
        self.store.flush()?;
        Ok(())
    }

    fn reload(&mut self) -> Result<&[PrefEntry], IndexError> {
        self.entries.clear();

        let raw_names = match self.store.list_raw_names() {
            Ok(names) => names,
            Err(StoreError::EnumerationUnsupported) => {
                self.enumeration_supported = false;
                if !self.enumeration_warned {
                    self.enumeration_warned = true;
                    logging::warn(
                        "preference enumeration is not supported on this platform; showing no entries",
                    );
                }
                return Ok(&self.entries);
            }
            Err(error) => return Err(error.into()),
        };
        self.enumeration_supported = true;

        let groups = group_raw_names(&raw_names, &self.query);
        self.entries = resolve_groups(&self.store, &groups, self.show_raw_keys, self.strategy);
        Ok(&self.entries)
    }
}

/// Groups raw names by clean key in discovery order, keeping names that contain
/// `query` case-insensitively. Degenerate names are dropped.
pub fn group_raw_names(raw_names: &[String], query: &str) -> IndexMap<String, Vec<String>> {
    let needle = query.to_lowercase();
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();

    for raw in raw_names {
        if raw.is_empty() {
            continue;
        }
        if !needle.is_empty() && !raw.to_lowercase().contains(&needle) {
            continue;
        }

        let normalized = normalize(raw);
        if normalized.is_degenerate() {
            logging::info(&format!("skipping preference key without a name: {raw}"));
            continue;
        }
        groups.entry(normalized.clean).or_default().push(raw.clone());
    }

    groups
}

/// Probes each group's representative once and emits one entry per group, or one per
/// raw variant when `show_raw_keys` is set.
pub fn resolve_groups<S>(
    store: &S,
    groups: &IndexMap<String, Vec<String>>,
    show_raw_keys: bool,
    strategy: ProbeStrategy,
) -> Vec<PrefEntry>
where
    S: PreferenceStore + ?Sized,
{
    let mut entries = Vec::with_capacity(groups.len());

    for (clean, variants) in groups {
        let Some(representative) = variants.first() else {
            continue;
        };
        let found = probe(store, representative, strategy);

        if show_raw_keys {
            entries.extend(variants.iter().map(|variant| {
                PrefEntry::new(variant, clean, variant, found.value_type, &found.rendered)
            }));
        } else {
            entries.push(PrefEntry::new(
                clean,
                clean,
                representative,
                found.value_type,
                &found.rendered,
            ));
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::{group_raw_names, PreferenceIndex};
    use crate::memory_store::MemoryStore;
    use crate::model::TypedValue;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn groups_variants_in_discovery_order() {
        let groups = group_raw_names(
            &names(&["mute_habcd", "score", "mute_hzzzz", "score_h1"]),
            "",
        );

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["mute", "score"]);
        assert_eq!(groups["mute"], names(&["mute_habcd", "mute_hzzzz"]));
        assert_eq!(groups["score"], names(&["score", "score_h1"]));
    }

    #[test]
    fn filter_applies_to_raw_names_before_grouping() {
        let groups = group_raw_names(&names(&["level_hABC", "level", "name"]), "habc");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["level"], names(&["level_hABC"]));
    }

    #[test]
    fn drops_degenerate_and_empty_names() {
        let groups = group_raw_names(&names(&["_habc", "", "ok"]), "");
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("ok"));
    }

    #[test]
    fn unsupported_enumeration_warns_once_and_recovers() {
        let mut index = PreferenceIndex::new(
            MemoryStore::new()
                .with_value("volume", TypedValue::Int(3))
                .without_enumeration(),
        );

        assert!(index.refresh("", false).unwrap().is_empty());
        assert!(!index.enumeration_supported());
        assert!(index.enumeration_warned);

        assert!(index.refresh("", true).unwrap().is_empty());
        assert!(!index.enumeration_supported());
        assert!(index.enumeration_warned);

        index.store.set_enumeration_supported(true);
        let entries = index.refresh("", false).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(index.enumeration_supported());
    }
}
