use serde::{Deserialize, Serialize};

use crate::contract::{CoreRequest, CoreResponse, EntriesResponse};
use crate::model::ValueType;
use crate::pref_index::{IndexError, PreferenceIndex};
use crate::store::PreferenceStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    InvalidValue,
    Store,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request<S: PreferenceStore>(
    index: &mut PreferenceIndex<S>,
    request: CoreRequest,
) -> TransportResponse {
    match execute(index, request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err { error },
    }
}

pub fn handle_json<S: PreferenceStore>(index: &mut PreferenceIndex<S>, payload: &str) -> String {
    match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => encode(&handle_request(index, request)),
        Err(error) => reject_json(&error.to_string()),
    }
}

/// Encoded `invalid_json` answer for input that never reached the request parser.
pub fn reject_json(message: &str) -> String {
    encode(&TransportResponse::Err {
        error: ErrorResponse {
            code: ErrorCode::InvalidJson,
            message: message.to_string(),
        },
    })
}

fn encode(response: &TransportResponse) -> String {
    serde_json::to_string(response).expect("transport response should serialize")
}

fn execute<S: PreferenceStore>(
    index: &mut PreferenceIndex<S>,
    request: CoreRequest,
) -> Result<CoreResponse, ErrorResponse> {
    match request {
        CoreRequest::Refresh(refresh) => {
            index
                .refresh(&refresh.query, refresh.show_raw_keys)
                .map_err(map_index_error)?;
        }
        CoreRequest::Add(add) => {
            let value_type = value_type_for(add.type_index)?;
            index
                .add(&add.key, value_type, &add.value)
                .map_err(map_index_error)?;
        }
        CoreRequest::Delete(delete) => {
            if delete.raw_key.is_empty() {
                return Err(invalid_request("raw_key is required".to_string()));
            }
            index.delete(&delete.raw_key).map_err(map_index_error)?;
        }
        CoreRequest::Edit(edit) => {
            if edit.raw_key.is_empty() {
                return Err(invalid_request("raw_key is required".to_string()));
            }
            let value_type = value_type_for(edit.type_index)?;
            index
                .edit(&edit.raw_key, &edit.clean_key, value_type, &edit.value)
                .map_err(map_index_error)?;
        }
        CoreRequest::DeleteAll => {
            index.delete_all().map_err(map_index_error)?;
        }
    }

    Ok(CoreResponse::Entries(EntriesResponse {
        entries: index.entries().to_vec(),
        enumeration_supported: index.enumeration_supported(),
    }))
}

fn value_type_for(type_index: usize) -> Result<ValueType, ErrorResponse> {
    ValueType::from_index(type_index)
        .ok_or_else(|| invalid_request(format!("unsupported type index {type_index}")))
}

fn invalid_request(message: String) -> ErrorResponse {
    ErrorResponse {
        code: ErrorCode::InvalidRequest,
        message,
    }
}

fn map_index_error(error: IndexError) -> ErrorResponse {
    match error {
        IndexError::InvalidValue { .. } => ErrorResponse {
            code: ErrorCode::InvalidValue,
            message: error.to_string(),
        },
        IndexError::EmptyKey | IndexError::UnsupportedType(_) => invalid_request(error.to_string()),
        IndexError::Store(store_error) => ErrorResponse {
            code: ErrorCode::Store,
            message: store_error.to_string(),
        },
    }
}
