use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access/refresh token pair returned by credential sign-in and identity
/// exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Response of a refresh call. The backend mints a new access token only;
/// the refresh token is not rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Lifecycle of an agent run as tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Whether the run has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A single agent run, as returned by run listing and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: Uuid,
    /// Website the agent was pointed at.
    pub target_url: String,
    /// What the agent was asked to do there.
    pub task_prompt: String,
    pub favicon_url: Option<String>,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
}

/// Request body for launching a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRun {
    pub target_url: String,
    pub task_prompt: String,
}

/// Request body for account registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// A registered account, as confirmed by registration or `/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_uses_backend_casing() {
        assert_eq!(serde_json::to_string(&RunStatus::Running).unwrap(), "\"RUNNING\"");
        let status: RunStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, RunStatus::Completed);
    }

    #[test]
    fn agent_run_decodes_backend_payload() {
        let payload = serde_json::json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "target_url": "https://example.com",
            "task_prompt": "find the pricing page",
            "favicon_url": null,
            "status": "PENDING",
            "created_at": "2025-06-01T12:00:00Z",
        });

        let run: AgentRun = serde_json::from_value(payload).unwrap();
        assert_eq!(run.status, RunStatus::Pending);
        assert!(run.favicon_url.is_none());
        assert!(!run.status.is_finished());
    }

    #[test]
    fn token_pair_tolerates_missing_token_type() {
        let pair: TokenPair = serde_json::from_value(serde_json::json!({
            "access_token": "aaa",
            "refresh_token": "rrr",
        }))
        .unwrap();
        assert_eq!(pair.token_type, "");
    }
}
