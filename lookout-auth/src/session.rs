//! Session state owned by the manager.

use chrono::{DateTime, Utc};
use lookout_core::{LookoutError, Result, TokenPair};

use crate::claims::Claims;

/// Why a session became unusable.
///
/// Sticky: once set, only a fresh sign-in clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The refresh token was rejected, or the refresh call failed in
    /// transit. Either way the session is done; the user must sign in again.
    RefreshFailed,
}

/// An authenticated session: the token pair plus the claims decoded from the
/// access token at mint time.
///
/// Created at sign-in, mutated only by the manager's refresh routine,
/// destroyed at sign-out.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) subject: String,
    pub(crate) last_error: Option<SessionError>,
}

impl Session {
    /// Build a session from a freshly minted token pair, decoding the access
    /// token's `sub` and `exp` claims.
    pub(crate) fn from_token_pair(pair: TokenPair) -> Result<Self> {
        let claims = Claims::decode(&pair.access_token)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| LookoutError::token("exp claim out of range"))?;

        Ok(Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at,
            subject: claims.sub,
            last_error: None,
        })
    }

    /// Replace the access token after a successful refresh, re-deriving the
    /// expiry from the new token's claims.
    pub(crate) fn install_refreshed(&mut self, access_token: String) -> Result<()> {
        let claims = Claims::decode(&access_token)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| LookoutError::token("exp claim out of range"))?;

        self.access_token = access_token;
        self.expires_at = expires_at;
        self.subject = claims.sub;
        self.last_error = None;
        Ok(())
    }

    /// Whether the access token is still usable at `now`.
    pub(crate) fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Stable user identifier from the access token's `sub` claim.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Instant past which the access token must not be handed out.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The sticky error, if a refresh has failed.
    pub fn last_error(&self) -> Option<SessionError> {
        self.last_error
    }
}
