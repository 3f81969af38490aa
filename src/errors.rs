use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the persisted key/value session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Terminal session failures. Cloned to every request waiting on the same refresh cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("token refresh rejected with status {0}")]
    RefreshRejected(u16),
    #[error("token refresh request failed: {0}")]
    Transport(String),
    #[error("invalid token refresh response: {0}")]
    InvalidResponse(String),
    #[error("session could not be persisted: {0}")]
    Storage(String),
    #[error("token refresh was abandoned before it settled")]
    Abandoned,
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

/// Errors surfaced by the authenticated HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session invalid: {0}")]
    SessionInvalid(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    /// True when the caller has been logged out and must re-authenticate.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ClientError::SessionInvalid(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    LoginRejected { status: StatusCode, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors returned by the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("API responded with status {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("API returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ApiError::Client(err) if err.is_session_invalid())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Client(ClientError::Http(err))
    }
}
