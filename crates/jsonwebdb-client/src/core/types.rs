use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column metadata attached to a cursor. Names are always lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sqltype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    precision: Option<Precision>,
}

impl ColumnDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            data_type: None,
            sqltype: None,
            precision: None,
        }
    }

    pub fn with_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_sqltype(mut self, sqltype: impl Into<String>) -> Self {
        self.sqltype = Some(sqltype.into());
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: i32) -> Self {
        self.precision = Some(Precision { precision, scale });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type as reported by the backend.
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    /// Native SQL type of the underlying database.
    pub fn sqltype(&self) -> Option<&str> {
        self.sqltype.as_deref()
    }

    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }
}

/// `[precision, scale]` on the wire. Scale may be negative, e.g. `-127`
/// for Oracle FLOAT and unsized NUMBER columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, i32)", into = "(u32, i32)")]
pub struct Precision {
    pub precision: u32,
    pub scale: i32,
}

impl From<(u32, i32)> for Precision {
    fn from((precision, scale): (u32, i32)) -> Self {
        Self { precision, scale }
    }
}

impl From<Precision> for (u32, i32) {
    fn from(p: Precision) -> Self {
        (p.precision, p.scale)
    }
}

/// A named parameter substituted into the sql source by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindValue {
    pub name: String,
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl BindValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            data_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, value: impl Into<Value>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            data_type: Some(data_type.into()),
        }
    }
}

/// Ordered column/value pairs making up one row to insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value of an existing column, otherwise appends it.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.to_string(), value)),
        }
        self
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&Value> {
        self.entries.iter().map(|(_, v)| v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub page_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_names_are_lower_cased() {
        let col = ColumnDefinition::new("EMP_ID").with_type("integer");
        assert_eq!(col.name(), "emp_id");
        assert_eq!(col.data_type(), Some("integer"));
    }

    #[test]
    fn precision_serializes_as_pair() {
        let col = ColumnDefinition::new("salary").with_precision(8, 2);
        let v = serde_json::to_value(&col).unwrap();
        assert_eq!(v, json!({ "name": "salary", "precision": [8, 2] }));

        let col = ColumnDefinition::new("amount").with_precision(126, -127);
        assert_eq!(serde_json::to_value(&col).unwrap()["precision"], json!([126, -127]));
    }

    #[test]
    fn record_set_replaces_in_place() {
        let mut rec = Record::new();
        rec.set("id", 1).set("name", "scott").set("ID", 2);
        assert_eq!(rec.columns(), vec!["id", "name"]);
        assert_eq!(rec.get("id"), Some(&json!(2)));
    }

    #[test]
    fn bind_value_omits_missing_type() {
        let v = serde_json::to_value(BindValue::new("id", 7)).unwrap();
        assert_eq!(v, json!({ "name": "id", "value": 7 }));
        let v = serde_json::to_value(BindValue::typed("d", "2024-01-01", "date")).unwrap();
        assert_eq!(v["type"], "date");
    }
}
