use thiserror::Error;

/// Result type for Lookout operations.
pub type Result<T> = std::result::Result<T, LookoutError>;

/// Errors surfaced by the Lookout client SDK.
///
/// Authentication failures are split by origin so the consumer can route
/// them: [`InvalidCredentials`](LookoutError::InvalidCredentials) and
/// [`ExchangeFailed`](LookoutError::ExchangeFailed) belong to the initiating
/// sign-in action, while [`RefreshFailed`](LookoutError::RefreshFailed) is a
/// session-level signal that the user must re-authenticate.
#[derive(Debug, Error)]
pub enum LookoutError {
    /// Sign-in rejected by the backend (wrong identifier or secret).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Third-party identity token exchange rejected.
    #[error("identity exchange failed: {0}")]
    ExchangeFailed(String),

    /// Refresh token rejected, or transport failure during refresh.
    ///
    /// Terminal for the session: not retried automatically.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Account registration rejected (duplicate email, missing password, ...).
    #[error("registration rejected: {0}")]
    Registration(String),

    /// Access token could not be decoded into the expected claims.
    #[error("token error: {0}")]
    Token(String),

    /// An operation that needs a session was called without one.
    #[error("not signed in")]
    NotSignedIn,

    /// Non-auth error response from the backend.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body, or the status reason when the body is empty.
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// URL construction error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl LookoutError {
    /// Create a new invalid-credentials error.
    pub fn credentials<S: Into<String>>(msg: S) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    /// Create a new identity-exchange error.
    pub fn exchange<S: Into<String>>(msg: S) -> Self {
        Self::ExchangeFailed(msg.into())
    }

    /// Create a new refresh error.
    pub fn refresh<S: Into<String>>(msg: S) -> Self {
        Self::RefreshFailed(msg.into())
    }

    /// Create a new token-decode error.
    pub fn token<S: Into<String>>(msg: S) -> Self {
        Self::Token(msg.into())
    }

    /// Create a new API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    /// Whether this error means the session is unusable and the user must
    /// sign in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::RefreshFailed(_) | Self::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LookoutError::credentials("bad password");
        assert_eq!(err.to_string(), "invalid credentials: bad password");

        let err = LookoutError::api(404, "Agent run not found");
        assert_eq!(err.to_string(), "API error: 404 - Agent run not found");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: LookoutError = serde_err.into();
        assert!(matches!(err, LookoutError::Serde(_)));
    }

    #[test]
    fn test_requires_sign_in() {
        assert!(LookoutError::refresh("revoked").requires_sign_in());
        assert!(LookoutError::NotSignedIn.requires_sign_in());
        assert!(!LookoutError::credentials("nope").requires_sign_in());
    }
}
