//! Pluggable server-push transport.
//!
//! The reconnect policy lives in the subscription loop, not here: a
//! transport only knows how to open one connection and hand back its frames.
//! That keeps the production SSE transport and test doubles on identical
//! footing.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::pin::Pin;
use tracing::debug;
use url::Url;

/// Transport-level failure. Transient by contract: the subscription loop
/// recovers from every one of these; none ever surfaces as a hard error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not establish the connection.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The connection broke mid-stream.
    #[error("stream interrupted: {0}")]
    Interrupted(String),

    /// The server closed the stream. Treated like any other disruption:
    /// the subscription only ends by explicit teardown.
    #[error("stream ended by server")]
    Ended,
}

/// Ordered frames from one connection. `None` means the server closed it.
pub type FrameStream =
    Pin<Box<dyn Stream<Item = std::result::Result<String, TransportError>> + Send>>;

/// A unidirectional server-push text stream.
#[async_trait]
pub trait StreamTransport: Send + Sync + 'static {
    /// Open a single connection to `url` and return its frames in arrival
    /// order.
    async fn open(&self, url: &Url) -> std::result::Result<FrameStream, TransportError>;
}

/// Server-sent-events transport over HTTP.
///
/// Issues a `GET` with `Accept: text/event-stream` and decodes the response
/// body as SSE, yielding each event's data as one frame.
pub struct SseTransport {
    http: Client,
}

impl SseTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    /// Use a custom `reqwest::Client` (proxies, default headers, timeouts).
    pub fn with_http_client(http: Client) -> Self {
        Self { http }
    }
}

impl Default for SseTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamTransport for SseTransport {
    async fn open(&self, url: &Url) -> std::result::Result<FrameStream, TransportError> {
        debug!(%url, "opening event stream");
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Connect(format!("server answered {status}")));
        }

        let frames = response.bytes_stream().eventsource().map(|event| match event {
            Ok(event) => Ok(event.data),
            Err(e) => Err(TransportError::Interrupted(e.to_string())),
        });

        Ok(Box::pin(frames))
    }
}
