use std::sync::Arc;

use crate::{
    core::{
        ident::is_safe_table_ref,
        insert::Insert,
        request::{Invoke, Request, RequestKind},
        response::Response,
        types::ColumnDefinition,
    },
    error::{JwdbError, JwdbResult},
    session::{require_guid, Session},
};

/// A backend table and the column metadata known for it.
#[derive(Clone)]
pub struct Table {
    session: Arc<dyn Session>,
    source: String,
    columns: Vec<ColumnDefinition>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("source", &self.source)
            .field("columns", &self.columns)
            .finish()
    }
}

impl Table {
    pub fn new(session: Arc<dyn Session>, source: &str) -> JwdbResult<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(JwdbError::MissingSource);
        }
        if !is_safe_table_ref(source) {
            return Err(JwdbError::InvalidRequest(format!(
                "invalid table identifier: {source}"
            )));
        }
        require_guid(session.as_ref())?;
        Ok(Self {
            session,
            source: source.to_string(),
            columns: Vec::new(),
        })
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDefinition>) -> Self {
        self.columns = columns;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Loads column metadata from the backend. On a declined request the
    /// known columns are left untouched.
    pub async fn describe(&mut self) -> JwdbResult<bool> {
        let guid = require_guid(self.session.as_ref())?;
        let req = Request::new(RequestKind::Table, Invoke::Describe)
            .source(&self.source)
            .session(&guid);
        let resp = Response::parse(self.session.invoke(req.into_json()).await?)?;
        if !resp.success {
            tracing::warn!(table = %self.source, message = %resp.failure_message(), "describe declined");
            return Ok(false);
        }
        self.columns = resp.column_definitions();
        tracing::debug!(table = %self.source, columns = self.columns.len(), "table described");
        Ok(true)
    }

    pub fn insert(&self) -> Insert {
        Insert::new(self.clone())
    }
}
