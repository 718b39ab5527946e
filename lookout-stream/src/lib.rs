//! # lookout-stream
//!
//! Auto-reconnecting client for the backend's live log streams.
//!
//! ## Overview
//!
//! - [`LogStreamClient`] - Opens subscriptions scoped to one run id
//! - [`LogSubscription`] - Handle over the ordered line buffer and state
//! - [`ActiveLogStream`] - Holds at most one subscription, switching sources
//! - [`StreamTransport`] / [`SseTransport`] - Pluggable server-push transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lookout_stream::LogStreamClient;
//! use url::Url;
//!
//! # fn run() -> lookout_core::Result<()> {
//! let client = LogStreamClient::new(Url::parse("https://api.example.com/").unwrap());
//! let logs = client.subscribe("run-42")?;
//!
//! // Later, from the render loop:
//! for line in logs.lines() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A subscription never gives up on its own: transport errors put it in
//! [`ConnectionState::Reconnecting`] and it keeps retrying with capped
//! exponential backoff until [`LogSubscription::unsubscribe`] (or drop)
//! tears it down. Lines already received are never discarded by a
//! disruption; a single diagnostic line marks each one.

pub mod client;
pub mod reconnect;
pub mod state;
pub mod transport;

pub use client::{ActiveLogStream, LogStreamClient, LogSubscription, RECONNECT_DIAGNOSTIC};
pub use reconnect::ReconnectPolicy;
pub use state::ConnectionState;
pub use transport::{FrameStream, SseTransport, StreamTransport, TransportError};
