mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{JwdbError, JwdbResult};

pub use http::{HttpSession, HttpSessionConfig};

/// Transport handle used by every request builder.
///
/// `invoke` performs exactly one request/response round trip. Backend
/// declines (`"success": false`) are returned as `Ok`; only transport and
/// decoding failures are errors.
#[async_trait]
pub trait Session: Send + Sync {
    /// Session guid issued by the backend, `None` while not connected.
    fn guid(&self) -> Option<String>;

    async fn invoke(&self, request: Value) -> JwdbResult<Value>;
}

pub(crate) fn require_guid(session: &dyn Session) -> JwdbResult<String> {
    session
        .guid()
        .filter(|g| !g.trim().is_empty())
        .ok_or(JwdbError::MissingSession)
}
