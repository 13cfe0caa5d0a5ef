use prefview_core::contract::{CoreRequest, CoreResponse, RefreshRequest};
use prefview_core::memory_store::MemoryStore;
use prefview_core::model::{TypedValue, ValueType};
use prefview_core::pref_index::PreferenceIndex;
use prefview_core::transport::{handle_json, handle_request, TransportResponse};

fn index() -> PreferenceIndex<MemoryStore> {
    PreferenceIndex::new(
        MemoryStore::new()
            .with_value("score_habcd", TypedValue::Int(42))
            .with_value("playerName", TypedValue::String("Ada".to_string())),
    )
}

fn error_code(raw: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(value["status"], "err");
    value["error"]["code"].as_str().unwrap().to_string()
}

#[test]
fn refresh_answers_with_entries() {
    let mut index = index();

    let response = handle_request(
        &mut index,
        CoreRequest::Refresh(RefreshRequest {
            query: "score".to_string(),
            show_raw_keys: false,
        }),
    );

    match response {
        TransportResponse::Ok {
            response: CoreResponse::Entries(entries),
        } => {
            assert!(entries.enumeration_supported);
            assert_eq!(entries.entries.len(), 1);
            assert_eq!(entries.entries[0].value_type, ValueType::Int);
            assert_eq!(entries.entries[0].value, "42");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn json_add_round_trips_through_index() {
    let mut index = index();

    let raw = handle_json(
        &mut index,
        r#"{"kind":"Add","payload":{"key":"volume","type_index":2,"value":"0.75"}}"#,
    );

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["status"], "ok");
    let entries = value["response"]["payload"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2]["clean_key"], "volume");
    assert_eq!(entries[2]["value"], "0.75");
}

#[test]
fn malformed_json_is_invalid_json() {
    let mut index = index();
    assert_eq!(error_code(&handle_json(&mut index, "{not json")), "invalid_json");
}

#[test]
fn bad_type_index_is_invalid_request() {
    let mut index = index();

    let raw = handle_json(
        &mut index,
        r#"{"kind":"Add","payload":{"key":"k","type_index":3,"value":"1"}}"#,
    );

    assert_eq!(error_code(&raw), "invalid_request");
    assert!(index.store().get("k").is_none());
}

#[test]
fn empty_keys_are_invalid_requests() {
    let mut index = index();

    let delete = handle_json(&mut index, r#"{"kind":"Delete","payload":{"raw_key":""}}"#);
    let add = handle_json(
        &mut index,
        r#"{"kind":"Add","payload":{"key":"","type_index":0,"value":"x"}}"#,
    );

    assert_eq!(error_code(&delete), "invalid_request");
    assert_eq!(error_code(&add), "invalid_request");
    assert_eq!(index.store().len(), 2);
}

#[test]
fn unparseable_int_is_invalid_value() {
    let mut index = index();

    let response = handle_json(
        &mut index,
        r#"{"kind":"Add","payload":{"key":"lives","type_index":1,"value":"many"}}"#,
    );

    let value: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(value["error"]["code"], "invalid_value");
    assert_eq!(
        value["error"]["message"],
        "The value could not be converted to an integer."
    );
}

#[test]
fn delete_all_clears_store() {
    let mut index = index();

    let response = handle_request(&mut index, CoreRequest::DeleteAll);

    assert!(matches!(response, TransportResponse::Ok { .. }));
    assert!(index.store().is_empty());
}
