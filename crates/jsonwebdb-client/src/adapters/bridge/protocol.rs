use serde::{Deserialize, Serialize};
use serde_json::Value;

use jsonwebdb_client::{BindValue, ColumnDefinition, Cursor};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeRequest {
    pub v: u32,
    pub id: String,
    pub cmd: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct BridgeResponse<T> {
    pub v: u32,
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(v: u32, id: String, data: T) -> Self {
        Self {
            v,
            id,
            status: "ok",
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(v: u32, id: String, code: &'static str, error: String) -> Self {
        Self {
            v,
            id,
            status: "error",
            data: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

// Payloads

#[derive(Debug, Deserialize)]
pub struct ConnectPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SqlPayload {
    pub sql: String,
    #[serde(default)]
    pub bindvalues: Vec<BindValue>,
    #[serde(default)]
    pub savepoint: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SelectPayload {
    pub sql: String,
    #[serde(default)]
    pub bindvalues: Vec<BindValue>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub close: bool,
}

#[derive(Debug, Deserialize)]
pub struct ColumnValue {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct InsertRowPayload {
    pub table: String,
    pub values: Vec<ColumnValue>,
    #[serde(default)]
    pub returning: Vec<String>,
    #[serde(default)]
    pub savepoint: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TablePayload {
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct CursorPayload {
    pub cursor: String,
}

// Response data

#[derive(Debug, Serialize)]
pub struct RowsData {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Value>,
    pub more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl RowsData {
    pub fn from_cursor(cursor: &Cursor) -> Self {
        Self {
            columns: cursor.columns().to_vec(),
            rows: cursor.rows().iter().map(|r| r.to_json()).collect(),
            more: cursor.has_more(),
            cursor: cursor.name().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AffectedData {
    pub affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returning: Option<RowsData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_payload_defaults() {
        let p: SelectPayload = serde_json::from_value(json!({ "sql": "select 1" })).unwrap();
        assert!(p.bindvalues.is_empty());
        assert!(p.page_size.is_none());
        assert!(!p.close);
    }

    #[test]
    fn error_response_skips_data() {
        let r: BridgeResponse<Value> = BridgeResponse::err(1, "7".into(), "MISSING_SOURCE", "sql source is missing".into());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            json!({ "v": 1, "id": "7", "status": "error", "error": "sql source is missing", "code": "MISSING_SOURCE" })
        );
    }

    #[test]
    fn rows_data_from_local_cursor() {
        let cursor = Cursor::new(vec![ColumnDefinition::new("ID")], vec![json!([3])]);
        let data = serde_json::to_value(RowsData::from_cursor(&cursor)).unwrap();
        assert_eq!(data, json!({ "columns": [{ "name": "id" }], "rows": [{ "id": 3 }], "more": false }));
    }
}
