/// Uniform error contract for every API call.
///
/// The taxonomy mirrors how failures are handled upstream of the client:
/// - [`ApiError::Network`]: no response was received; retry the action.
/// - [`ApiError::Unauthorized`]: 401/403; the session must be invalidated
///   and the operator sent back to login. `message` carries the server's
///   explanation (e.g. "Invalid password") when the body supplied one.
/// - [`ApiError::Api`]: any other non-2xx; `message` carries the server's
///   human-readable message when the body supplied one.
/// - [`ApiError::Decode`]: a 2xx response whose body did not match the
///   expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authorization failed ({status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("invalid request parameters: {0}")]
    InvalidParams(String),
}

impl ApiError {
    /// True for 401/403 responses, which should end the current session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The HTTP status, when a response was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-supplied human message, when one was present.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } => Some(message),
            ApiError::Unauthorized { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
