//! # lookout-auth
//!
//! Session and token management for the Lookout client SDK.
//!
//! ## Overview
//!
//! - [`SessionManager`] - Owns the session; signs in, refreshes, signs out
//! - [`Session`] - Token pair plus decoded claims and sticky error state
//! - [`Claims`] - The `sub`/`exp` claims read from an access token
//! - [`RouteGuard`] - Default-deny gate for paths that need a session
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lookout_auth::SessionManager;
//! use url::Url;
//!
//! # async fn run() -> lookout_core::Result<()> {
//! let auth = SessionManager::new(Url::parse("https://api.example.com/").unwrap());
//! auth.sign_in("user@example.com", "hunter2").await?;
//!
//! // Always valid: refreshed transparently when expired.
//! let bearer = auth.access_token().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The manager is the single mutation boundary for the session: consumers
//! read tokens through [`SessionManager::access_token`] and never touch the
//! stored credentials directly.

pub mod claims;
pub mod guard;
pub mod manager;
pub mod session;

pub use claims::Claims;
pub use guard::{Access, RouteGuard};
pub use manager::SessionManager;
pub use session::{Session, SessionError};
