use serde_json::{Map, Value};

use crate::core::types::BindValue;

/// Top-level envelope key of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Table,
    Sql,
    Cursor,
    Session,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Table => "Table",
            RequestKind::Sql => "Sql",
            RequestKind::Cursor => "Cursor",
            RequestKind::Session => "Session",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoke {
    Execute,
    Insert,
    Update,
    Select,
    Delete,
    Describe,
    Fetch,
    Close,
    Connect,
    Keepalive,
    Disconnect,
}

impl Invoke {
    pub fn as_str(self) -> &'static str {
        match self {
            Invoke::Execute => "execute",
            Invoke::Insert => "insert",
            Invoke::Update => "update",
            Invoke::Select => "select",
            Invoke::Delete => "delete",
            Invoke::Describe => "describe",
            Invoke::Fetch => "fetch",
            Invoke::Close => "close",
            Invoke::Connect => "connect",
            Invoke::Keepalive => "keepalive",
            Invoke::Disconnect => "disconnect",
        }
    }

    /// Key of the operation specific sub-object, e.g. `"select()"`.
    fn method_key(self) -> String {
        format!("{}()", self.as_str())
    }
}

/// Builder for one request envelope.
///
/// ```text
/// { "<Kind>": { "invoke": .., "source": .., "session": .., "bindvalues": [..],
///               "savepoint": .., "<invoke>()": { .. } } }
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    kind: RequestKind,
    invoke: Invoke,
    body: Map<String, Value>,
    method: Option<Map<String, Value>>,
}

impl Request {
    pub fn new(kind: RequestKind, invoke: Invoke) -> Self {
        let mut body = Map::new();
        body.insert("invoke".into(), Value::from(invoke.as_str()));
        Self {
            kind,
            invoke,
            body,
            method: None,
        }
    }

    pub fn source(self, source: &str) -> Self {
        self.field("source", source)
    }

    pub fn session(self, guid: &str) -> Self {
        self.field("session", guid)
    }

    pub fn bindvalues(mut self, bindvalues: &[BindValue]) -> Self {
        if !bindvalues.is_empty() {
            let list = bindvalues
                .iter()
                .map(|b| serde_json::to_value(b).unwrap_or(Value::Null))
                .collect();
            self.body.insert("bindvalues".into(), Value::Array(list));
        }
        self
    }

    pub fn savepoint(mut self, savepoint: Option<bool>) -> Self {
        if let Some(flag) = savepoint {
            self.body.insert("savepoint".into(), Value::Bool(flag));
        }
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    /// Adds an entry to the `"<invoke>()"` sub-object.
    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.method
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn invoke(&self) -> Invoke {
        self.invoke
    }

    pub fn into_json(self) -> Value {
        let mut body = self.body;
        if let Some(method) = self.method {
            body.insert(self.invoke.method_key(), Value::Object(method));
        }
        let mut envelope = Map::new();
        envelope.insert(self.kind.as_str().to_string(), Value::Object(body));
        Value::Object(envelope)
    }
}
