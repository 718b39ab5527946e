//! # lookout-api
//!
//! Typed REST client for the Lookout backend.
//!
//! ## Overview
//!
//! [`ApiClient`] wraps the authenticated endpoints: listing and launching
//! agent runs, fetching run detail, and reading the signed-in account. Every
//! call obtains its bearer token from the shared
//! [`SessionManager`](lookout_auth::SessionManager), so token expiry and
//! refresh are handled transparently. A
//! [`RefreshFailed`](lookout_core::LookoutError::RefreshFailed) coming out
//! of any call is the signal to send the user back to sign-in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lookout_api::ApiClient;
//! use lookout_auth::SessionManager;
//! use url::Url;
//!
//! # async fn run() -> lookout_core::Result<()> {
//! let base = Url::parse("https://api.example.com/").unwrap();
//! let auth = Arc::new(SessionManager::new(base.clone()));
//! auth.sign_in("user@example.com", "hunter2").await?;
//!
//! let api = ApiClient::new(base, auth);
//! for run in api.list_runs().await? {
//!     println!("{} -> {:?}", run.target_url, run.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::ApiClient;
