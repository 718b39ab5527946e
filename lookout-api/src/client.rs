//! The REST client.

use std::sync::Arc;

use lookout_auth::SessionManager;
use lookout_core::{Account, AgentRun, LookoutError, NewRun, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Client for the backend's authenticated REST endpoints.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth: Arc<SessionManager>,
}

impl ApiClient {
    /// Client for the backend at `base_url`, authenticating through `auth`.
    pub fn new(base_url: Url, auth: Arc<SessionManager>) -> Self {
        Self::with_http_client(base_url, auth, Client::new())
    }

    /// Client with a custom `reqwest::Client`.
    pub fn with_http_client(base_url: Url, auth: Arc<SessionManager>, http: Client) -> Self {
        Self { http, base_url, auth }
    }

    /// All runs of the signed-in user, newest first.
    pub async fn list_runs(&self) -> Result<Vec<AgentRun>> {
        let url = self.endpoint("agent/runs")?;
        self.get_json(url).await
    }

    /// One run by id.
    pub async fn get_run(&self, id: Uuid) -> Result<AgentRun> {
        let url = self.endpoint(&format!("agent/runs/{id}"))?;
        self.get_json(url).await
    }

    /// Queue a new run. The backend accepts it (202) and tracks it from
    /// `Pending` onward.
    pub async fn launch_run(&self, run: &NewRun) -> Result<AgentRun> {
        debug!(target_url = %run.target_url, "launching agent run");
        let url = self.endpoint("agent/runs")?;
        self.post_json(url, run).await
    }

    /// The signed-in account.
    pub async fn current_account(&self) -> Result<Account> {
        let url = self.endpoint("users/me")?;
        self.get_json(url).await
    }

    /// URL of the live log stream for `run_id`, for
    /// [`lookout_stream::LogStreamClient`] to connect to.
    ///
    /// [`lookout_stream::LogStreamClient`]: https://docs.rs/lookout-stream
    pub fn log_stream_url(&self, run_id: &str) -> Result<Url> {
        self.endpoint(&format!("agent/logs/{run_id}"))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Perform a GET and deserialize the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.auth.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Perform a POST with a JSON body and deserialize the JSON response.
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T> {
        let token = self.auth.access_token().await?;
        let response = self.http.post(url).bearer_auth(token).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Turn non-success statuses into [`LookoutError::Api`], keeping the
    /// error body for the message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        };
        Err(LookoutError::api(status.as_u16(), message))
    }
}
