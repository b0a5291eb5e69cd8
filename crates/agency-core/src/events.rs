//! Broadcast bus for subscription lifecycle events.
//!
//! The subscription core emits structured lifecycle events instead of
//! relying on log capture; observers subscribe to the bus, live listeners
//! only (no history).

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// One step in a subscription's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A (re)connect attempt is starting; the first attempt is zero.
    ConnectAttempt { attempt: u32 },
    /// The push stream is established and active.
    StreamEstablished,
    /// A raw event arrived from the stream.
    EventReceived,
    /// A raw event was filtered out before delivery.
    EventDropped,
    /// The stream surfaced an error.
    StreamError { message: String },
    /// The peer closed the stream.
    StreamEnded,
    /// A reconnect was scheduled after the given delay.
    ReconnectScheduled { delay: Duration },
    /// A correlated status fetch failed; the event was dropped.
    FetchFailed { protocol_id: String },
    /// A terminal protocol instance was released.
    Released { protocol_id: String },
    /// Releasing a terminal protocol instance failed.
    ReleaseFailed { protocol_id: String },
    /// The subscription was cancelled.
    Cancelled,
}

/// Lifecycle event bus.
///
/// Sends are lossy when no observer is subscribed, so emitting is always
/// cheap for callers that never look.
#[derive(Debug)]
pub struct LifecycleBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleBus {
    /// Create a new bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    /// Emit an event to all current observers.
    pub fn emit(&self, event: LifecycleEvent) {
        tracing::trace!(?event, "lifecycle");
        let _ = self.sender.send(event);
    }

    /// Subscribe to live events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Live events as a stream, dropping lagged entries.
    #[must_use]
    pub fn stream(&self) -> futures::stream::BoxStream<'static, LifecycleEvent> {
        BroadcastStream::new(self.subscribe())
            .filter_map(|res| async move { res.ok() })
            .boxed()
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}
