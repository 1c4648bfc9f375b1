use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwdbError {
    #[error("sql source is missing")]
    MissingSource,

    #[error("session is missing or not connected")]
    MissingSession,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend declined: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl JwdbError {
    pub fn code(&self) -> &'static str {
        match self {
            JwdbError::MissingSource => "MISSING_SOURCE",
            JwdbError::MissingSession => "MISSING_SESSION",
            JwdbError::InvalidRequest(_) => "INVALID_REQUEST",
            JwdbError::Http { .. } => "HTTP_ERROR",
            JwdbError::Transport(_) => "TRANSPORT_ERROR",
            JwdbError::Backend(_) => "BACKEND_DECLINED",
            JwdbError::Io(_) => "IO_ERROR",
            JwdbError::Json(_) => "JSON_ERROR",
            JwdbError::Internal(_) => "INTERNAL",
        }
    }

    /// Precondition violations raised before anything is sent.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            JwdbError::MissingSource | JwdbError::MissingSession | JwdbError::InvalidRequest(_)
        )
    }
}

pub type JwdbResult<T> = Result<T, JwdbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(JwdbError::MissingSource.code(), "MISSING_SOURCE");
        assert_eq!(
            JwdbError::Http { status: 502, message: "bad gateway".into() }.code(),
            "HTTP_ERROR"
        );
        assert_eq!(JwdbError::Backend("x".into()).to_string(), "backend declined: x");
    }

    #[test]
    fn config_errors_are_flagged() {
        assert!(JwdbError::MissingSession.is_config_error());
        assert!(JwdbError::InvalidRequest("t".into()).is_config_error());
        assert!(!JwdbError::Internal("t".into()).is_config_error());
    }
}
