use std::sync::Arc;

use serde_json::Value;

use crate::{
    core::{
        request::{Invoke, Request, RequestKind},
        response::Response,
        types::ColumnDefinition,
    },
    error::{JwdbError, JwdbResult},
    session::{require_guid, Session},
};

/// One row of a cursor, bound to the cursor's column metadata.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Vec<ColumnDefinition>>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(column))?;
        self.values.get(idx)
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn to_json(&self) -> Value {
        let map = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.name().to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Buffered page of rows returned by the backend.
///
/// When the backend kept a cursor open, further pages are pulled with
/// [`Cursor::fetch`].
pub struct Cursor {
    columns: Arc<Vec<ColumnDefinition>>,
    rows: Vec<Vec<Value>>,
    pos: usize,
    more: bool,
    name: Option<String>,
    session: Option<Arc<dyn Session>>,
    error: Option<String>,
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("pos", &self.pos)
            .field("more", &self.more)
            .field("name", &self.name)
            .field("error", &self.error)
            .finish()
    }
}

impl Cursor {
    /// Cursor over rows with no server side state.
    pub fn new(columns: Vec<ColumnDefinition>, rows: Vec<Value>) -> Self {
        let columns = Arc::new(columns);
        let rows = normalize_rows(&columns, rows);
        Self {
            columns,
            rows,
            pos: 0,
            more: false,
            name: None,
            session: None,
            error: None,
        }
    }

    pub(crate) fn from_response(
        columns: Vec<ColumnDefinition>,
        resp: Response,
        session: Arc<dyn Session>,
    ) -> Self {
        let mut cursor = Self::new(columns, resp.rows.unwrap_or_default());
        cursor.more = resp.more;
        cursor.name = resp.cursor;
        if cursor.name.is_some() {
            cursor.session = Some(session);
        }
        cursor
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Server side cursor name, if the backend kept one open.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rows in the current page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.more && self.name.is_some()
    }

    pub fn next_row(&mut self) -> Option<Row> {
        let values = self.rows.get(self.pos)?.clone();
        self.pos += 1;
        Some(Row {
            columns: Arc::clone(&self.columns),
            values,
        })
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|values| Row {
                columns: Arc::clone(&self.columns),
                values: values.clone(),
            })
            .collect()
    }

    /// Replaces the buffered page with the next one from the backend.
    /// Returns `false` when there was nothing left to fetch or the backend
    /// declined.
    pub async fn fetch(&mut self) -> JwdbResult<bool> {
        self.error = None;
        if !self.has_more() {
            return Ok(false);
        }
        let resp = self.cursor_request(Invoke::Fetch).await?;
        if !resp.success {
            let message = resp.failure_message();
            tracing::warn!(cursor = ?self.name, %message, "fetch declined");
            self.error = Some(message);
            self.more = false;
            return Ok(false);
        }
        self.rows = normalize_rows(&self.columns, resp.rows.unwrap_or_default());
        self.pos = 0;
        self.more = resp.more;
        Ok(true)
    }

    /// Releases the server side cursor. A no-op for local cursors.
    pub async fn close(&mut self) -> JwdbResult<bool> {
        self.error = None;
        if self.name.is_none() || self.session.is_none() {
            return Ok(true);
        }
        let resp = self.cursor_request(Invoke::Close).await?;
        self.more = false;
        self.session = None;
        if !resp.success {
            let message = resp.failure_message();
            tracing::warn!(cursor = ?self.name, %message, "close declined");
            self.error = Some(message);
        }
        Ok(resp.success)
    }

    /// True when the last `fetch` or `close` was declined by the backend.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    async fn cursor_request(&self, invoke: Invoke) -> JwdbResult<Response> {
        let (Some(name), Some(session)) = (self.name.as_deref(), self.session.as_ref()) else {
            return Err(JwdbError::Internal("cursor has no server side".into()));
        };
        let guid = require_guid(session.as_ref())?;
        let req = Request::new(RequestKind::Cursor, invoke)
            .field("cursor", name)
            .session(&guid);
        tracing::debug!(cursor = name, invoke = invoke.as_str(), "cursor request");
        Response::parse(session.invoke(req.into_json()).await?)
    }
}

/// Rows may arrive positionally or keyed by column name.
fn normalize_rows(columns: &[ColumnDefinition], rows: Vec<Value>) -> Vec<Vec<Value>> {
    rows.into_iter()
        .map(|row| match row {
            Value::Array(values) => values,
            Value::Object(map) => columns
                .iter()
                .map(|c| {
                    map.iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(c.name()))
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Null)
                })
                .collect(),
            other => {
                tracing::warn!(row = %other, "row is neither an array nor an object");
                vec![other]
            }
        })
        .collect()
}
