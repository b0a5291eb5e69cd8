//! Public subscription entry points.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::watch;

use agency_core::AgencyError;
use agency_core::config::ClientConfig;
use agency_core::events::{LifecycleBus, LifecycleEvent};
use agency_core::traits::{
    AgentService, MetaProvider, QuestionHandler, StatusHandler, TransportError,
};
use agency_core::types::{AgentStatus, CallMetadata, ClientId, ListenStatus, Question};

use crate::controller::{ReconnectController, StreamDriver};
use crate::fetcher::CorrelationFetcher;
use crate::handle::{self, SubscriptionHandle};
use crate::options::ListenOptions;
use crate::router::{self, Routing};

/// Subscription manager for one agency connection.
///
/// Cheap to share; each started subscription runs independently with its
/// own stream, retry state and reconnect timer.
pub struct Subscriber {
    agent: Arc<dyn AgentService>,
    provider: Arc<dyn MetaProvider>,
    config: ClientConfig,
    events: Arc<LifecycleBus>,
}

impl Subscriber {
    /// Create a subscriber, reading configuration from the environment.
    #[must_use]
    pub fn new(agent: Arc<dyn AgentService>, provider: Arc<dyn MetaProvider>) -> Self {
        Self::with_config(agent, provider, ClientConfig::from_env())
    }

    /// Create a subscriber with explicit configuration.
    #[must_use]
    pub fn with_config(
        agent: Arc<dyn AgentService>,
        provider: Arc<dyn MetaProvider>,
        config: ClientConfig,
    ) -> Self {
        Self {
            agent,
            provider,
            config,
            events: Arc::new(LifecycleBus::new()),
        }
    }

    /// Lifecycle event bus shared by all subscriptions of this subscriber.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleBus {
        &self.events
    }

    /// Start the general status subscription.
    ///
    /// Validates options before any network call and acquires the first
    /// attempt's identity and metadata, so configuration and
    /// authentication errors are returned here instead of being retried.
    ///
    /// # Errors
    /// Returns a configuration error for inconsistent options, or an
    /// authentication error when metadata acquisition fails.
    pub async fn start_listening(
        &self,
        handler: Arc<dyn StatusHandler>,
        options: ListenOptions,
    ) -> Result<SubscriptionHandle, AgencyError> {
        options.validate()?;

        let client_id = self.provider.client_id();
        let meta = self.provider.meta().await?;
        tracing::debug!(client_id = %client_id, ?options, "start listening");

        let fetcher = options
            .protocol
            .as_ref()
            .filter(|_| options.auto_protocol_status)
            .map(|protocol| {
                Arc::new(CorrelationFetcher::new(
                    Arc::clone(protocol),
                    options.auto_release,
                    Arc::clone(&self.events),
                ))
            });
        let driver = ListenDriver {
            agent: Arc::clone(&self.agent),
            handler,
            options,
            fetcher,
            events: Arc::clone(&self.events),
        };

        Ok(self.spawn(driver, client_id, meta))
    }

    /// Start the question subscription.
    ///
    /// No filtering, no correlation, and reconnects unconditionally on
    /// stream teardown; stream errors are logged and swallowed.
    ///
    /// # Errors
    /// Returns an authentication error when metadata acquisition fails.
    pub async fn start_waiting(
        &self,
        handler: Arc<dyn QuestionHandler>,
    ) -> Result<SubscriptionHandle, AgencyError> {
        let client_id = self.provider.client_id();
        let meta = self.provider.meta().await?;
        tracing::debug!(client_id = %client_id, "start waiting");

        let driver = WaitDriver {
            agent: Arc::clone(&self.agent),
            handler,
        };

        Ok(self.spawn(driver, client_id, meta))
    }

    fn spawn<D: StreamDriver>(
        &self,
        driver: D,
        client_id: ClientId,
        meta: CallMetadata,
    ) -> SubscriptionHandle {
        let controller = ReconnectController::new(
            driver,
            Arc::clone(&self.provider),
            self.config,
            Arc::clone(&self.events),
        );
        let (subscription, cancel_rx) = SubscriptionHandle::new(client_id.clone());
        tokio::spawn(controller.run((client_id, meta), cancel_rx));
        subscription
    }
}

/// Driver for the general status stream.
struct ListenDriver {
    agent: Arc<dyn AgentService>,
    handler: Arc<dyn StatusHandler>,
    options: ListenOptions,
    fetcher: Option<Arc<CorrelationFetcher>>,
    events: Arc<LifecycleBus>,
}

#[async_trait]
impl StreamDriver for ListenDriver {
    type Event = AgentStatus;

    async fn open(
        &self,
        client_id: &ClientId,
        meta: &CallMetadata,
    ) -> Result<BoxStream<'static, Result<AgentStatus, TransportError>>, TransportError> {
        self.agent.listen(client_id, meta).await
    }

    async fn on_event(&self, status: AgentStatus, cancel_rx: &watch::Receiver<bool>) {
        match router::route(&status, &self.options) {
            Routing::Drop => {
                tracing::debug!("notification filtered");
                self.events.emit(LifecycleEvent::EventDropped);
            }
            Routing::Deliver => {
                if handle::is_cancelled(cancel_rx) {
                    return;
                }
                self.handler
                    .on_status(ListenStatus {
                        agent: status,
                        protocol: None,
                    })
                    .await;
            }
            Routing::Fetch(key) => {
                // The router only asks for a fetch when correlation is
                // enabled, and validation guarantees the service then.
                if let Some(fetcher) = &self.fetcher {
                    let fetcher = Arc::clone(fetcher);
                    let handler = Arc::clone(&self.handler);
                    let cancel_rx = cancel_rx.clone();
                    // Spawned so a slow correlated fetch never stalls the
                    // stream; delivery order across events is relaxed.
                    tokio::spawn(async move {
                        fetcher
                            .fetch_and_deliver(status, key, &handler, &cancel_rx)
                            .await;
                    });
                }
            }
        }
    }

    async fn on_fatal(&self, error: TransportError) {
        self.handler.on_error(error).await;
    }

    fn retry_on_error(&self) -> bool {
        self.options.retry_on_error
    }
}

/// Driver for the question stream; retries unconditionally.
struct WaitDriver {
    agent: Arc<dyn AgentService>,
    handler: Arc<dyn QuestionHandler>,
}

#[async_trait]
impl StreamDriver for WaitDriver {
    type Event = Question;

    async fn open(
        &self,
        client_id: &ClientId,
        meta: &CallMetadata,
    ) -> Result<BoxStream<'static, Result<Question, TransportError>>, TransportError> {
        self.agent.wait(client_id, meta).await
    }

    async fn on_event(&self, question: Question, cancel_rx: &watch::Receiver<bool>) {
        if handle::is_cancelled(cancel_rx) {
            return;
        }
        self.handler.on_question(question).await;
    }

    async fn on_fatal(&self, error: TransportError) {
        // Unreachable while retry_on_error is unconditionally true; the
        // question stream has no caller-visible error channel.
        tracing::error!(%error, "question stream fatal error");
    }

    fn retry_on_error(&self) -> bool {
        true
    }
}
