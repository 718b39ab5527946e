//! Subscriptions over a server-push log stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use lookout_core::Result;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::reconnect::{ReconnectDelay, ReconnectPolicy};
use crate::state::ConnectionState;
use crate::transport::{SseTransport, StreamTransport, TransportError};

/// Diagnostic line appended to the buffer when the transport drops.
///
/// One per disruption: repeated failed reconnect attempts inside the same
/// outage do not stack additional lines.
pub const RECONNECT_DIAGNOSTIC: &str = "[ERROR] log stream connection lost; reconnecting";

/// Opens log subscriptions scoped to one run id each.
pub struct LogStreamClient {
    transport: Arc<dyn StreamTransport>,
    base_url: Url,
    reconnect: ReconnectPolicy,
}

impl LogStreamClient {
    /// Client using the SSE transport against the backend at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self::with_transport(base_url, Arc::new(SseTransport::new()))
    }

    /// Client with a custom transport.
    pub fn with_transport(base_url: Url, transport: Arc<dyn StreamTransport>) -> Self {
        Self { transport, base_url, reconnect: ReconnectPolicy::default() }
    }

    /// Override the reconnect pacing.
    #[must_use]
    pub fn with_reconnect_policy(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Subscribe to the log stream of `source_id`.
    ///
    /// Returns immediately; a background task drives the connection. Must be
    /// called within a tokio runtime.
    pub fn subscribe(&self, source_id: &str) -> Result<LogSubscription> {
        let url = self.base_url.join(&format!("agent/logs/{source_id}"))?;
        let shared = Arc::new(Shared {
            source_id: source_id.to_string(),
            state: RwLock::new(ConnectionState::Connecting),
            buffer: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        });

        let task = tokio::spawn(drive(
            Arc::clone(&shared),
            Arc::clone(&self.transport),
            url,
            self.reconnect.clone(),
        ));

        Ok(LogSubscription { shared, task })
    }
}

/// Handle over one live subscription.
///
/// Dropping the handle tears the subscription down the same way
/// [`unsubscribe`](Self::unsubscribe) does.
pub struct LogSubscription {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl LogSubscription {
    /// The run id this subscription is scoped to.
    pub fn source_id(&self) -> &str {
        &self.shared.source_id
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read().unwrap()
    }

    /// Snapshot of every line received so far, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.shared.buffer.read().unwrap().clone()
    }

    /// Number of lines received so far.
    pub fn len(&self) -> usize {
        self.shared.buffer.read().unwrap().len()
    }

    /// Whether no lines have been received yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tear the subscription down. Idempotent.
    ///
    /// Cancels any in-flight connect or pending backoff timer; no line is
    /// appended to the buffer after this returns.
    pub fn unsubscribe(&self) {
        {
            // Taking the buffer lock fences out a push racing this call:
            // once the lock is released with `closed` set, no later push
            // can land.
            let _buffer = self.shared.buffer.write().unwrap();
            if self.shared.closed.swap(true, Ordering::SeqCst) {
                return;
            }
        }
        self.task.abort();
        *self.shared.state.write().unwrap() = ConnectionState::Closed;
        debug!(source_id = %self.shared.source_id, "log stream unsubscribed");
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Holds at most one live subscription and switches it between sources.
///
/// Changing the source is unsubscribe-then-subscribe: the old connection is
/// torn down and the buffer starts empty, so lines from different sources
/// never mix. Exactly one connection exists per active source.
pub struct ActiveLogStream {
    client: LogStreamClient,
    current: Option<LogSubscription>,
}

impl ActiveLogStream {
    pub fn new(client: LogStreamClient) -> Self {
        Self { client, current: None }
    }

    /// Point the stream at `source_id`, or tear it down with `None`.
    ///
    /// Re-setting the current source is a no-op; the connection and buffer
    /// are kept.
    pub fn set_source(&mut self, source_id: Option<&str>) -> Result<()> {
        if self.current.as_ref().map(|s| s.source_id()) == source_id {
            return Ok(());
        }
        if let Some(old) = self.current.take() {
            old.unsubscribe();
        }
        if let Some(id) = source_id {
            self.current = Some(self.client.subscribe(id)?);
        }
        Ok(())
    }

    /// The currently followed source, if any.
    pub fn source_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.source_id())
    }

    /// Lines of the current subscription; empty when detached.
    pub fn lines(&self) -> Vec<String> {
        self.current.as_ref().map(|s| s.lines()).unwrap_or_default()
    }

    /// State of the current subscription; `Closed` when detached.
    pub fn state(&self) -> ConnectionState {
        self.current.as_ref().map(|s| s.state()).unwrap_or(ConnectionState::Closed)
    }
}

struct Shared {
    source_id: String,
    state: RwLock<ConnectionState>,
    buffer: RwLock<Vec<String>>,
    closed: AtomicBool,
}

impl Shared {
    /// Append a line unless the subscription has been torn down.
    fn push_line(&self, line: String) {
        let mut buffer = self.buffer.write().unwrap();
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        buffer.push(line);
    }

    fn set_state(&self, state: ConnectionState) {
        let mut current = self.state.write().unwrap();
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        *current = state;
    }

    fn state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }

    /// Record a disruption: flip to `Reconnecting` and append the diagnostic
    /// line, but only on the transition into the outage.
    fn note_disruption(&self, error: &TransportError) {
        warn!(source_id = %self.source_id, %error, "log stream disrupted");
        if self.state() != ConnectionState::Reconnecting {
            self.set_state(ConnectionState::Reconnecting);
            self.push_line(RECONNECT_DIAGNOSTIC.to_string());
        }
    }
}

/// Connection loop: connect, pump frames, reconnect forever. Only task
/// abort (via unsubscribe or drop) ends it.
async fn drive(
    shared: Arc<Shared>,
    transport: Arc<dyn StreamTransport>,
    url: Url,
    policy: ReconnectPolicy,
) {
    use futures::StreamExt;

    let mut delay = ReconnectDelay::new(policy);
    loop {
        match transport.open(&url).await {
            Ok(mut frames) => loop {
                match frames.next().await {
                    Some(Ok(frame)) => {
                        if shared.state() != ConnectionState::Open {
                            debug!(source_id = %shared.source_id, "log stream open");
                            shared.set_state(ConnectionState::Open);
                        }
                        delay.reset();
                        shared.push_line(frame);
                    }
                    Some(Err(error)) => {
                        shared.note_disruption(&error);
                        break;
                    }
                    None => {
                        shared.note_disruption(&TransportError::Ended);
                        break;
                    }
                }
            },
            Err(error) => shared.note_disruption(&error),
        }

        tokio::time::sleep(delay.next()).await;
    }
}
