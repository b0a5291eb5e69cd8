//! Correlated protocol-status fetching and auto-release.

use std::sync::Arc;

use tokio::sync::watch;

use agency_core::events::{LifecycleBus, LifecycleEvent};
use agency_core::traits::{ProtocolService, StatusHandler};
use agency_core::types::{AgentStatus, ListenStatus, ProtocolId};

use crate::handle;

/// Issues the secondary correlated call for one status update and, on a
/// terminal result, optionally releases the protocol instance.
pub(crate) struct CorrelationFetcher {
    protocol: Arc<dyn ProtocolService>,
    auto_release: bool,
    events: Arc<LifecycleBus>,
}

impl CorrelationFetcher {
    pub(crate) fn new(
        protocol: Arc<dyn ProtocolService>,
        auto_release: bool,
        events: Arc<LifecycleBus>,
    ) -> Self {
        Self {
            protocol,
            auto_release,
            events,
        }
    }

    /// Fetch the correlated status and deliver the enriched event.
    ///
    /// A fetch failure drops the event without invoking the handler; the
    /// subscription itself is unaffected. A result arriving after
    /// cancellation is discarded. Release failures are logged only -
    /// delivery has already happened by then.
    pub(crate) async fn fetch_and_deliver(
        &self,
        agent: AgentStatus,
        key: ProtocolId,
        handler: &Arc<dyn StatusHandler>,
        cancel_rx: &watch::Receiver<bool>,
    ) {
        let status = match self.protocol.status(&key).await {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(protocol_id = %key.id, %error, "protocol status fetch failed");
                self.events.emit(LifecycleEvent::FetchFailed {
                    protocol_id: key.id,
                });
                return;
            }
        };

        if handle::is_cancelled(cancel_rx) {
            return;
        }

        let terminal = status.is_terminal();
        handler
            .on_status(ListenStatus {
                agent,
                protocol: Some(status),
            })
            .await;

        if terminal && self.auto_release {
            match self.protocol.release(&key).await {
                Ok(()) => {
                    tracing::debug!(protocol_id = %key.id, "protocol released");
                    self.events.emit(LifecycleEvent::Released {
                        protocol_id: key.id,
                    });
                }
                Err(error) => {
                    tracing::warn!(protocol_id = %key.id, %error, "protocol release failed");
                    self.events.emit(LifecycleEvent::ReleaseFailed {
                        protocol_id: key.id,
                    });
                }
            }
        }
    }
}
