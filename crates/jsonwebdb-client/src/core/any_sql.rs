use std::sync::Arc;

use crate::{
    core::{
        cursor::Cursor,
        request::{Invoke, Request, RequestKind},
        response::Response,
        types::BindValue,
    },
    error::{JwdbError, JwdbResult},
    session::{require_guid, Session},
};

/// Runs arbitrary sql text against the backend.
pub struct AnySql {
    session: Arc<dyn Session>,
    source: String,
    bindvalues: Vec<BindValue>,
    savepoint: Option<bool>,
    success: bool,
    error: Option<String>,
    affected: u64,
}

impl std::fmt::Debug for AnySql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnySql")
            .field("source", &self.source)
            .field("bindvalues", &self.bindvalues)
            .field("savepoint", &self.savepoint)
            .field("success", &self.success)
            .field("error", &self.error)
            .field("affected", &self.affected)
            .finish()
    }
}

impl AnySql {
    /// Fails before any network traffic when the source is blank or the
    /// session is absent or not connected.
    pub fn new(
        session: Option<Arc<dyn Session>>,
        source: Option<&str>,
        bindvalues: Vec<BindValue>,
    ) -> JwdbResult<Self> {
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(JwdbError::MissingSource)?;
        let session = session.ok_or(JwdbError::MissingSession)?;
        require_guid(session.as_ref())?;
        Ok(Self {
            session,
            source: source.to_string(),
            bindvalues,
            savepoint: None,
            success: false,
            error: None,
            affected: 0,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bindvalues(&self) -> &[BindValue] {
        &self.bindvalues
    }

    pub fn add_bindvalue(&mut self, bindvalue: BindValue) -> &mut Self {
        self.bindvalues.push(bindvalue);
        self
    }

    pub fn use_savepoint(&mut self, flag: bool) -> &mut Self {
        self.savepoint = Some(flag);
        self
    }

    pub async fn execute(&mut self) -> JwdbResult<bool> {
        self.mutate(Invoke::Execute).await
    }

    pub async fn insert(&mut self) -> JwdbResult<bool> {
        self.mutate(Invoke::Insert).await
    }

    pub async fn update(&mut self) -> JwdbResult<bool> {
        self.mutate(Invoke::Update).await
    }

    pub async fn delete(&mut self) -> JwdbResult<bool> {
        self.mutate(Invoke::Delete).await
    }

    /// Runs the source as a query. With `close_cursor` the backend returns
    /// a single page and releases its cursor; otherwise further pages can
    /// be pulled through [`Cursor::fetch`]. Returns `None` when declined.
    pub async fn select(&mut self, page_size: usize, close_cursor: bool) -> JwdbResult<Option<Cursor>> {
        self.reset();
        let req = self
            .request(Invoke::Select)?
            .arg("pagesize", page_size)
            .arg("cursor", !close_cursor);
        let resp = self.send(req).await?;
        if !self.success {
            return Ok(None);
        }
        let columns = resp.column_definitions();
        Ok(Some(Cursor::from_response(columns, resp, Arc::clone(&self.session))))
    }

    async fn mutate(&mut self, invoke: Invoke) -> JwdbResult<bool> {
        self.reset();
        let req = self.request(invoke)?;
        self.send(req).await?;
        Ok(self.success)
    }

    pub(crate) fn request(&self, invoke: Invoke) -> JwdbResult<Request> {
        let guid = require_guid(self.session.as_ref())?;
        Ok(Request::new(RequestKind::Sql, invoke)
            .source(&self.source)
            .session(&guid)
            .bindvalues(&self.bindvalues)
            .savepoint(self.savepoint))
    }

    async fn send(&mut self, req: Request) -> JwdbResult<Response> {
        let invoke = req.invoke();
        tracing::debug!(invoke = invoke.as_str(), binds = self.bindvalues.len(), "sql request");
        let resp = Response::parse(self.session.invoke(req.into_json()).await?)?;
        self.success = resp.success;
        if resp.success {
            self.affected = resp.affected.unwrap_or(0);
        } else {
            let message = resp.failure_message();
            tracing::warn!(invoke = invoke.as_str(), %message, "sql declined");
            self.error = Some(message);
        }
        Ok(resp)
    }

    fn reset(&mut self) {
        self.success = false;
        self.error = None;
        self.affected = 0;
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
}
