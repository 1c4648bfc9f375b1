use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::types::{ColumnDefinition, Precision};
use crate::error::JwdbResult;

/// Column descriptor as sent by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub sqltype: Option<String>,
    #[serde(default, deserialize_with = "lenient_precision")]
    pub precision: Option<Precision>,
}

/// A malformed precision drops the metadata, not the whole response.
fn lenient_precision<'de, D>(deserializer: D) -> Result<Option<Precision>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<Precision>(raw.clone()) {
        Ok(p) => Ok(Some(p)),
        Err(e) => {
            tracing::warn!(precision = %raw, error = %e, "ignoring unreadable column precision");
            Ok(None)
        }
    }
}

impl From<ColumnDescriptor> for ColumnDefinition {
    fn from(d: ColumnDescriptor) -> Self {
        let mut def = ColumnDefinition::new(&d.name);
        if let Some(t) = d.data_type {
            def = def.with_type(t);
        }
        if let Some(t) = d.sqltype {
            def = def.with_sqltype(t);
        }
        if let Some(p) = d.precision {
            def = def.with_precision(p.precision, p.scale);
        }
        def
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub affected: Option<u64>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnDescriptor>>,
    #[serde(default)]
    pub rows: Option<Vec<Value>>,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

impl Response {
    pub fn parse(value: Value) -> JwdbResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn column_definitions(&self) -> Vec<ColumnDefinition> {
        self.columns
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(ColumnDefinition::from)
            .collect()
    }

    /// Declined responses without a message still need something to report.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "request declined by backend".to_string())
    }
}
