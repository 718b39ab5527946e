//! # lookout-core
//!
//! Shared error handling and wire types for the Lookout client SDK.
//!
//! ## Overview
//!
//! This crate provides the foundations the other Lookout crates build on:
//!
//! - [`LookoutError`] / [`Result`] - Unified error handling
//! - [`TokenPair`] / [`RefreshedToken`] - Token endpoint responses
//! - [`AgentRun`] / [`RunStatus`] - Run listing and detail payloads
//! - [`Account`] / [`NewAccount`] - Account registration payloads
//!
//! All wire types mirror the backend's JSON exactly; consumers never have to
//! rename fields or massage casing themselves.

pub mod error;
pub mod types;

pub use error::{LookoutError, Result};
pub use types::{Account, AgentRun, NewAccount, NewRun, RefreshedToken, RunStatus, TokenPair};
