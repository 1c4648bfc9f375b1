use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    core::{
        request::{Invoke, Request, RequestKind},
        response::Response,
    },
    error::{JwdbError, JwdbResult},
    session::Session,
};

#[derive(Debug, Clone)]
pub struct HttpSessionConfig {
    /// Full endpoint url requests are posted to.
    pub url: String,
    pub timeout_ms: u64,
}

impl HttpSessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: 30_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Session talking to the backend over HTTP POST.
#[derive(Debug)]
pub struct HttpSession {
    url: String,
    client: Client,
    guid: Mutex<Option<String>>,
}

impl HttpSession {
    pub fn new(config: HttpSessionConfig) -> JwdbResult<Self> {
        if config.url.trim().is_empty() {
            return Err(JwdbError::InvalidRequest("endpoint url is empty".into()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.url,
            client,
            guid: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn connect(&self, username: &str, password: &str) -> JwdbResult<String> {
        let req = Request::new(RequestKind::Session, Invoke::Connect)
            .field("username", username)
            .field("password", password);
        let resp = Response::parse(self.invoke(req.into_json()).await?)?;
        if !resp.success {
            tracing::warn!(url = %self.url, user = username, "connect declined");
            return Err(JwdbError::Backend(resp.failure_message()));
        }
        let guid = resp
            .session
            .ok_or_else(|| JwdbError::Internal("connect response carries no session".into()))?;
        *self.lock()? = Some(guid.clone());
        tracing::info!(url = %self.url, user = username, "session connected");
        Ok(guid)
    }

    pub async fn keepalive(&self) -> JwdbResult<bool> {
        let guid = super::require_guid(self)?;
        let req = Request::new(RequestKind::Session, Invoke::Keepalive).session(&guid);
        let resp = Response::parse(self.invoke(req.into_json()).await?)?;
        Ok(resp.success)
    }

    pub async fn disconnect(&self) -> JwdbResult<bool> {
        let guid = super::require_guid(self)?;
        let req = Request::new(RequestKind::Session, Invoke::Disconnect).session(&guid);
        let resp = Response::parse(self.invoke(req.into_json()).await?)?;
        *self.lock()? = None;
        tracing::info!(url = %self.url, "session disconnected");
        Ok(resp.success)
    }

    fn lock(&self) -> JwdbResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.guid
            .lock()
            .map_err(|_| JwdbError::Internal("poisoned lock".into()))
    }
}

#[async_trait]
impl Session for HttpSession {
    fn guid(&self) -> Option<String> {
        match self.guid.lock() {
            Ok(guid) => guid.clone(),
            // The guid is only ever replaced whole.
            Err(poisoned) => {
                tracing::error!(url = %self.url, "session lock poisoned, reading guid anyway");
                poisoned.into_inner().clone()
            }
        }
    }

    async fn invoke(&self, request: Value) -> JwdbResult<Value> {
        tracing::debug!(url = %self.url, "sending request");
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(status = status.as_u16(), %message, "http request failed");
            return Err(JwdbError::Http {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }
}
