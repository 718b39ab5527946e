//! The session's owning boundary.

use chrono::Utc;
use lookout_core::{Account, LookoutError, NewAccount, RefreshedToken, Result, TokenPair};
use reqwest::{Client, Response};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::session::{Session, SessionError};

/// Owns the session and is the only code allowed to mutate it.
///
/// All consumers share one manager (typically behind an `Arc`) and obtain
/// bearer tokens through [`access_token`](Self::access_token), which
/// refreshes transparently when the cached token has expired. The session is
/// kept behind an async mutex that stays locked across a refresh call, so
/// concurrent callers on an expired session trigger exactly one refresh and
/// all observe its outcome.
pub struct SessionManager {
    http: Client,
    base_url: Url,
    state: Mutex<Option<Session>>,
}

impl SessionManager {
    /// Create a manager for the backend at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Create a manager with a custom `reqwest::Client` (proxies, timeouts).
    pub fn with_http_client(base_url: Url, http: Client) -> Self {
        Self { http, base_url, state: Mutex::new(None) }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Exchange an identifier/secret pair for a session.
    ///
    /// The backend expects an OAuth2 password form (`username`/`password`).
    /// A 4xx answer means the credentials were wrong.
    pub async fn sign_in(&self, identifier: &str, secret: &str) -> Result<()> {
        let url = self.endpoint("auth/token")?;
        let response = self
            .http
            .post(url)
            .form(&[("username", identifier), ("password", secret)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            warn!(status = status.as_u16(), "credential sign-in rejected");
            if status.is_client_error() {
                return Err(LookoutError::credentials(detail));
            }
            return Err(LookoutError::api(status.as_u16(), detail));
        }

        let pair: TokenPair = response.json().await?;
        self.install(pair).await
    }

    /// Exchange a third-party identity token for a session.
    ///
    /// `provider` is the backend's provider slug (e.g. `google`, `github`);
    /// `provider_token` is the token that provider issued.
    pub async fn sign_in_with_provider(
        &self,
        provider: &str,
        provider_token: &str,
    ) -> Result<()> {
        let url = self.endpoint(&format!("auth/oauth/{provider}"))?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "token": provider_token }))
            .send()
            .await
            .map_err(|e| LookoutError::exchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = error_detail(response).await;
            warn!(status, provider, "identity exchange rejected");
            return Err(LookoutError::exchange(detail));
        }

        let pair: TokenPair =
            response.json().await.map_err(|e| LookoutError::exchange(e.to_string()))?;
        self.install(pair).await
    }

    /// Register a new account. Does not sign the account in.
    pub async fn register(&self, account: &NewAccount) -> Result<Account> {
        let url = self.endpoint("auth/register")?;
        let response = self.http.post(url).json(account).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            if status.is_client_error() {
                return Err(LookoutError::Registration(detail));
            }
            return Err(LookoutError::api(status.as_u16(), detail));
        }

        Ok(response.json().await?)
    }

    /// Produce a currently-valid access token.
    ///
    /// The common path is cheap: when the cached token has not expired it is
    /// returned without any network traffic. Past expiry, one refresh call
    /// is made and the session updated in place. A failed refresh is
    /// terminal: the error is recorded on the session and every later call
    /// fails fast with [`LookoutError::RefreshFailed`] until a new sign-in.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.state.lock().await;
        let session = guard.as_mut().ok_or(LookoutError::NotSignedIn)?;

        if session.last_error.is_some() {
            return Err(LookoutError::refresh("session expired; sign in again"));
        }

        // While a refresh is in flight the mutex stays held, so a caller that
        // queued behind it re-checks freshness against the updated session.
        if session.is_fresh(Utc::now()) {
            return Ok(session.access_token.clone());
        }

        match self.refresh(session).await {
            Ok(()) => Ok(session.access_token.clone()),
            Err(err) => {
                session.last_error = Some(SessionError::RefreshFailed);
                Err(err)
            }
        }
    }

    async fn refresh(&self, session: &mut Session) -> Result<()> {
        debug!(subject = %session.subject, "access token expired, refreshing");
        let url = self.endpoint("auth/token/refresh")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "refresh_token": session.refresh_token }))
            .send()
            .await
            .map_err(|e| LookoutError::refresh(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "refresh token rejected");
            return Err(LookoutError::refresh(format!("backend answered {status}")));
        }

        let refreshed: RefreshedToken =
            response.json().await.map_err(|e| LookoutError::refresh(e.to_string()))?;
        session
            .install_refreshed(refreshed.access_token)
            .map_err(|e| LookoutError::refresh(format!("unusable refreshed token: {e}")))?;

        debug!(subject = %session.subject, expires_at = %session.expires_at, "access token refreshed");
        Ok(())
    }

    /// Discard all session state. Idempotent.
    pub async fn sign_out(&self) {
        let mut guard = self.state.lock().await;
        if guard.take().is_some() {
            info!("signed out");
        }
    }

    /// Whether a session currently exists (expired or not).
    pub async fn is_signed_in(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// The signed-in user's stable identifier, if any.
    pub async fn subject(&self) -> Option<String> {
        self.state.lock().await.as_ref().map(|s| s.subject.clone())
    }

    /// The sticky session error, if a refresh has failed.
    pub async fn last_error(&self) -> Option<SessionError> {
        self.state.lock().await.as_ref().and_then(|s| s.last_error)
    }

    /// A read-only copy of the current session.
    pub async fn session(&self) -> Option<Session> {
        self.state.lock().await.clone()
    }

    async fn install(&self, pair: TokenPair) -> Result<()> {
        let session = Session::from_token_pair(pair)?;
        info!(subject = %session.subject, expires_at = %session.expires_at, "session established");
        *self.state.lock().await = Some(session);
        Ok(())
    }
}

/// Pull the backend's `{"detail": ...}` message out of an error response,
/// falling back to the raw body.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    if body.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    }
}
