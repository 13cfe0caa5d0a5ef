use prefview_core::memory_store::MemoryStore;
use prefview_core::model::{TypedValue, ValueType};
use prefview_core::store::{PreferenceStore, StoreError};

#[test]
fn typed_gets_return_default_for_absent_or_mismatched_keys() {
    let store = MemoryStore::new()
        .with_value("lives", TypedValue::Int(3))
        .with_value("name", TypedValue::String("Ada".to_string()));

    assert_eq!(store.get_int("lives", -1).unwrap(), 3);
    assert_eq!(store.get_string("lives", "none").unwrap(), "none");
    assert_eq!(store.get_float("lives", 9.5).unwrap(), 9.5);
    assert_eq!(store.get_string("name", "none").unwrap(), "Ada");
    assert_eq!(store.get_int("missing", 7).unwrap(), 7);
}

#[test]
fn enumerates_in_insertion_order_and_keeps_position_on_overwrite() {
    let mut store = MemoryStore::new();
    store.set_int("b", 1).unwrap();
    store.set_float("a", 0.5).unwrap();
    store.set_string("b", "two").unwrap();

    assert_eq!(store.list_raw_names().unwrap(), vec!["b", "a"]);
    assert_eq!(store.get("b"), Some(&TypedValue::String("two".to_string())));
}

#[test]
fn delete_preserves_order_of_remaining_keys() {
    let mut store = MemoryStore::new()
        .with_value("a", TypedValue::Int(1))
        .with_value("b", TypedValue::Int(2))
        .with_value("c", TypedValue::Int(3));

    store.delete_key("a").unwrap();
    store.delete_key("missing").unwrap();

    assert_eq!(store.list_raw_names().unwrap(), vec!["b", "c"]);
}

#[test]
fn reports_enumeration_unsupported_when_disabled() {
    let store = MemoryStore::new().without_enumeration();
    assert_eq!(
        store.list_raw_names(),
        Err(StoreError::EnumerationUnsupported)
    );
}

#[test]
fn injected_read_failures_surface_as_access_errors() {
    let store = MemoryStore::new()
        .with_value("broken", TypedValue::Int(1))
        .fail_reads_for("broken");

    match store.get_int("broken", 0) {
        Err(StoreError::Access { key, .. }) => assert_eq!(key, "broken"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn native_type_reflects_stored_value() {
    let store = MemoryStore::new().with_value("volume", TypedValue::Float(0.5));
    assert_eq!(store.native_type("volume").unwrap(), Some(ValueType::Float));
    assert_eq!(store.native_type("missing").unwrap(), None);
}
