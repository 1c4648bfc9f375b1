use serde_json::{json, Value};

use crate::{
    core::{
        cursor::Cursor,
        request::{Invoke, Request, RequestKind},
        response::Response,
        table::Table,
        types::{ColumnDefinition, Record},
    },
    error::{JwdbError, JwdbResult},
    session::require_guid,
};

/// Inserts records into a [`Table`], optionally reading columns back.
#[derive(Debug)]
pub struct Insert {
    table: Table,
    returning: Vec<String>,
    savepoint: Option<bool>,
    success: bool,
    error: Option<String>,
    affected: u64,
    cursor: Option<Cursor>,
}

impl Insert {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            returning: Vec::new(),
            savepoint: None,
            success: false,
            error: None,
            affected: 0,
            cursor: None,
        }
    }

    pub fn set_return_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
        self.returning = columns
            .iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn use_savepoint(&mut self, flag: bool) -> &mut Self {
        self.savepoint = Some(flag);
        self
    }

    /// Sends one insert. Returns `false` when the backend declined it; the
    /// reason is then available from [`Insert::error_message`].
    pub async fn execute(&mut self, record: &Record) -> JwdbResult<bool> {
        self.reset();
        if record.is_empty() {
            return Err(JwdbError::InvalidRequest("record has no columns".into()));
        }
        let session = std::sync::Arc::clone(self.table.session());
        let guid = require_guid(session.as_ref())?;

        let request = self.build_request(&guid, record).into_json();
        tracing::debug!(table = %self.table.source(), columns = record.len(), "insert");
        let resp = Response::parse(session.invoke(request).await?)?;

        if !resp.success {
            let message = resp.failure_message();
            tracing::warn!(table = %self.table.source(), %message, "insert declined");
            self.error = Some(message);
            return Ok(false);
        }

        self.success = true;
        self.affected = resp.affected.unwrap_or(0);
        if !self.returning.is_empty() {
            let columns = self.returning_columns();
            self.cursor = Some(Cursor::from_response(columns, resp, session));
        }
        Ok(true)
    }

    pub(crate) fn build_request(&self, guid: &str, record: &Record) -> Request {
        let values: Vec<Value> = record
            .entries()
            .iter()
            .map(|(column, value)| json!({ "column": column, "value": value }))
            .collect();

        let mut req = Request::new(RequestKind::Table, Invoke::Insert)
            .source(self.table.source())
            .session(guid)
            .savepoint(self.savepoint)
            .arg("values", values);
        if !self.returning.is_empty() {
            req = req.arg("returning", self.returning.clone());
        }
        req
    }

    fn returning_columns(&self) -> Vec<ColumnDefinition> {
        self.returning
            .iter()
            .map(|name| {
                self.table
                    .column(name)
                    .cloned()
                    .unwrap_or_else(|| ColumnDefinition::new(name))
            })
            .collect()
    }

    fn reset(&mut self) {
        self.success = false;
        self.error = None;
        self.affected = 0;
        self.cursor = None;
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn failed(&self) -> bool {
        !self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn affected(&self) -> u64 {
        self.affected
    }

    /// Rows read back for the requested return columns.
    pub fn cursor(&mut self) -> Option<&mut Cursor> {
        self.cursor.as_mut()
    }

    pub fn take_cursor(&mut self) -> Option<Cursor> {
        self.cursor.take()
    }
}
