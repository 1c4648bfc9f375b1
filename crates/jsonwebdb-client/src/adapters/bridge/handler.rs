use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use jsonwebdb_client::{
    core::limits::effective_page_size,
    error::{JwdbError, JwdbResult},
    AnySql, Cursor, HttpSession, Invoke, Record, Session, Table,
};

use crate::cli::Args;

use super::protocol::*;

/// Session lifecycle beyond plain request/response.
#[async_trait]
pub trait SessionControl: Session + 'static {
    async fn connect(&self, username: &str, password: &str) -> JwdbResult<String>;
    async fn disconnect(&self) -> JwdbResult<bool>;
}

#[async_trait]
impl SessionControl for HttpSession {
    async fn connect(&self, username: &str, password: &str) -> JwdbResult<String> {
        HttpSession::connect(self, username, password).await
    }

    async fn disconnect(&self) -> JwdbResult<bool> {
        HttpSession::disconnect(self).await
    }
}

type Reply = BridgeResponse<Value>;

pub struct BridgeHandler<S> {
    args: Args,
    session: Arc<S>,
    cursors: HashMap<String, Cursor>,
}

impl<S: SessionControl> BridgeHandler<S> {
    pub fn new(args: Args, session: Arc<S>) -> Self {
        Self {
            args,
            session,
            cursors: HashMap::new(),
        }
    }

    pub async fn handle(&mut self, req: BridgeRequest) -> Reply {
        if req.v != PROTOCOL_VERSION {
            return BridgeResponse::err(
                req.v,
                req.id,
                "INVALID_REQUEST",
                format!("unsupported protocol version: {}", req.v),
            );
        }

        let v = req.v;
        let id = req.id.clone();
        let res = match req.cmd.as_str() {
            "connect" => self.handle_connect(req.payload).await,
            "disconnect" => self.handle_disconnect().await,
            "select" => self.handle_select(req.payload).await,
            "execute" => self.handle_sql(Invoke::Execute, req.payload).await,
            "insert" => self.handle_sql(Invoke::Insert, req.payload).await,
            "update" => self.handle_sql(Invoke::Update, req.payload).await,
            "delete" => self.handle_sql(Invoke::Delete, req.payload).await,
            "insert_row" => self.handle_insert_row(req.payload).await,
            "describe" => self.handle_describe(req.payload).await,
            "fetch" => self.handle_fetch(req.payload).await,
            "close" => self.handle_close(req.payload).await,
            other => Err(JwdbError::InvalidRequest(format!("unknown cmd: {other}"))),
        };

        match res {
            Ok(data) => BridgeResponse::ok(v, id, data),
            Err(e) => BridgeResponse::err(v, id, e.code(), e.to_string()),
        }
    }

    async fn handle_connect(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: ConnectPayload = parse(payload)?;
        let guid = self.session.connect(&p.username, &p.password).await?;
        Ok(serde_json::json!({ "session": guid }))
    }

    async fn handle_disconnect(&mut self) -> JwdbResult<Value> {
        let open: Vec<Cursor> = self.cursors.drain().map(|(_, c)| c).collect();
        for mut cursor in open {
            if let Err(e) = cursor.close().await {
                tracing::warn!(error = %e, "failed to close cursor on disconnect");
            }
        }
        Ok(Value::Bool(self.session.disconnect().await?))
    }

    async fn handle_select(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: SelectPayload = parse(payload)?;
        let page_size = effective_page_size(
            p.page_size.or(Some(self.args.page_size)),
            self.args.max_page_size,
        )
        .page_size;
        let mut sql = AnySql::new(Some(self.dyn_session()), Some(&p.sql), p.bindvalues)?;
        let cursor = sql
            .select(page_size, p.close)
            .await?
            .ok_or_else(|| declined(sql.error_message()))?;
        self.rows_reply(cursor)
    }

    async fn handle_sql(&mut self, invoke: Invoke, payload: Value) -> JwdbResult<Value> {
        let p: SqlPayload = parse(payload)?;
        let mut sql = AnySql::new(Some(self.dyn_session()), Some(&p.sql), p.bindvalues)?;
        if let Some(flag) = p.savepoint {
            sql.use_savepoint(flag);
        }
        let ok = match invoke {
            Invoke::Insert => sql.insert().await?,
            Invoke::Update => sql.update().await?,
            Invoke::Delete => sql.delete().await?,
            Invoke::Execute => sql.execute().await?,
            other => {
                return Err(JwdbError::Internal(format!(
                    "{} is not a sql statement verb",
                    other.as_str()
                )))
            }
        };
        if !ok {
            return Err(declined(sql.error_message()));
        }
        let data = AffectedData {
            affected: sql.affected(),
            returning: None,
        };
        Ok(serde_json::to_value(data)?)
    }

    async fn handle_insert_row(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: InsertRowPayload = parse(payload)?;
        let mut table = Table::new(self.dyn_session(), &p.table)?;
        if !p.returning.is_empty() && !table.describe().await? {
            tracing::debug!(table = %p.table, "describe declined; returning columns stay untyped");
        }

        let mut record = Record::new();
        for cv in p.values {
            record.set(&cv.column, cv.value);
        }

        let mut insert = table.insert();
        insert.set_return_columns(&p.returning[..]);
        if let Some(flag) = p.savepoint {
            insert.use_savepoint(flag);
        }
        if !insert.execute(&record).await? {
            return Err(declined(insert.error_message()));
        }
        let data = AffectedData {
            affected: insert.affected(),
            returning: insert.take_cursor().as_ref().map(RowsData::from_cursor),
        };
        Ok(serde_json::to_value(data)?)
    }

    async fn handle_describe(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: TablePayload = parse(payload)?;
        let mut table = Table::new(self.dyn_session(), &p.table)?;
        if !table.describe().await? {
            return Err(JwdbError::Backend(format!("describe {} declined", p.table)));
        }
        Ok(serde_json::to_value(table.columns())?)
    }

    async fn handle_fetch(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: CursorPayload = parse(payload)?;
        let mut cursor = self
            .cursors
            .remove(&p.cursor)
            .ok_or_else(|| JwdbError::InvalidRequest(format!("unknown cursor: {}", p.cursor)))?;
        match cursor.fetch().await {
            Ok(true) => self.rows_reply(cursor),
            Ok(false) => {
                let message = cursor
                    .error_message()
                    .map_or_else(|| format!("cursor {} is exhausted", p.cursor), str::to_string);
                if let Err(e) = cursor.close().await {
                    tracing::warn!(cursor = %p.cursor, error = %e, "failed to close cursor after fetch");
                }
                Err(JwdbError::Backend(message))
            }
            Err(e) => {
                self.cursors.insert(p.cursor, cursor);
                Err(e)
            }
        }
    }

    async fn handle_close(&mut self, payload: Value) -> JwdbResult<Value> {
        let p: CursorPayload = parse(payload)?;
        let closed = match self.cursors.remove(&p.cursor) {
            Some(mut cursor) => cursor.close().await?,
            None => false,
        };
        Ok(Value::Bool(closed))
    }

    /// Keeps cursors with further pages around for `fetch`.
    fn rows_reply(&mut self, cursor: Cursor) -> JwdbResult<Value> {
        let data = serde_json::to_value(RowsData::from_cursor(&cursor))?;
        if cursor.has_more() {
            if let Some(name) = cursor.name().map(str::to_string) {
                self.cursors.insert(name, cursor);
            }
        }
        Ok(data)
    }

    fn dyn_session(&self) -> Arc<dyn Session> {
        self.session.clone()
    }

    #[cfg(test)]
    fn open_cursors(&self) -> usize {
        self.cursors.len()
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> JwdbResult<T> {
    serde_json::from_value(payload).map_err(|e| JwdbError::InvalidRequest(e.to_string()))
}

fn declined(message: Option<&str>) -> JwdbError {
    JwdbError::Backend(message.unwrap_or("request declined by backend").to_string())
}
