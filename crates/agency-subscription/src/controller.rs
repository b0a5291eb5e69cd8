//! Retry-with-linear-backoff wrapper around a server-push stream factory.
//!
//! One controller drives one logical subscription: it acquires identity
//! and metadata per attempt, opens the stream, forwards events downstream
//! and reconnects on teardown. The invariant is at most one live stream
//! per subscription; a new attempt starts only after the previous stream
//! has been dropped, by sequencing alone.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::watch;

use agency_core::config::ClientConfig;
use agency_core::events::{LifecycleBus, LifecycleEvent};
use agency_core::traits::{MetaProvider, TransportError};
use agency_core::types::{CallMetadata, ClientId};

use crate::handle;
use crate::retry::RetryState;
use crate::state::LifecycleMachine;

/// Stream-kind specific behavior plugged into the controller.
///
/// The listen and wait subscriptions share the reconnect logic and differ
/// only in how they open their stream and what they do with its events.
#[async_trait]
pub(crate) trait StreamDriver: Send + Sync + 'static {
    type Event: Send + 'static;

    /// Open a fresh push stream for one attempt.
    async fn open(
        &self,
        client_id: &ClientId,
        meta: &CallMetadata,
    ) -> Result<BoxStream<'static, Result<Self::Event, TransportError>>, TransportError>;

    /// Handle one received event.
    async fn on_event(&self, event: Self::Event, cancel_rx: &watch::Receiver<bool>);

    /// Surface a non-retried fatal error; invoked at most once, after
    /// which the subscription terminates.
    async fn on_fatal(&self, error: TransportError);

    /// Whether stream errors and peer-closed streams trigger reconnects.
    fn retry_on_error(&self) -> bool;
}

/// Why the active stream stopped.
enum StreamOutcome {
    /// Torn down (peer end or retriable error); eligible for reconnect.
    Closed,
    /// Fatal error already surfaced to the handler.
    Fatal,
    /// Cancelled by the caller.
    Cancelled,
}

enum Flow {
    Continue,
    Stop,
}

/// Reconnect controller for one subscription.
pub(crate) struct ReconnectController<D: StreamDriver> {
    driver: D,
    provider: Arc<dyn MetaProvider>,
    config: ClientConfig,
    events: Arc<LifecycleBus>,
}

impl<D: StreamDriver> ReconnectController<D> {
    pub(crate) fn new(
        driver: D,
        provider: Arc<dyn MetaProvider>,
        config: ClientConfig,
        events: Arc<LifecycleBus>,
    ) -> Self {
        Self {
            driver,
            provider,
            config,
            events,
        }
    }

    /// Drive the subscription until it terminates or is cancelled.
    ///
    /// The first attempt reuses the identity and metadata acquired by the
    /// entry point, so that authentication failures reject the call
    /// instead of disappearing into the loop.
    pub(crate) async fn run(
        self,
        first: (ClientId, CallMetadata),
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        let mut retry = RetryState::new();
        let mut machine = LifecycleMachine::new();
        let mut next = Some(first);

        loop {
            if handle::is_cancelled(&cancel_rx) {
                self.finish_cancelled(&mut machine);
                return;
            }

            let (client_id, meta) = match next.take() {
                Some(pair) => pair,
                None => {
                    let client_id = self.provider.client_id();
                    match self.provider.meta().await {
                        Ok(meta) => (client_id, meta),
                        Err(error) => {
                            tracing::warn!(%error, "metadata acquisition failed");
                            match self
                                .fail_or_backoff(error.into(), &mut retry, &mut machine, &mut cancel_rx)
                                .await
                            {
                                Flow::Continue => continue,
                                Flow::Stop => return,
                            }
                        }
                    }
                }
            };

            self.events.emit(LifecycleEvent::ConnectAttempt {
                attempt: retry.attempt(),
            });
            tracing::debug!(client_id = %client_id, attempt = retry.attempt(), "connecting");

            let stream = tokio::select! {
                () = handle::cancelled(&mut cancel_rx) => {
                    self.finish_cancelled(&mut machine);
                    return;
                }
                opened = self.driver.open(&client_id, &meta) => match opened {
                    Ok(stream) => stream,
                    Err(error) => {
                        tracing::warn!(%error, "stream establishment failed");
                        self.events.emit(LifecycleEvent::StreamError {
                            message: error.to_string(),
                        });
                        match self
                            .fail_or_backoff(error, &mut retry, &mut machine, &mut cancel_rx)
                            .await
                        {
                            Flow::Continue => continue,
                            Flow::Stop => return,
                        }
                    }
                }
            };

            machine.established();
            self.events.emit(LifecycleEvent::StreamEstablished);

            match self.drive(stream, &mut retry, &mut cancel_rx).await {
                StreamOutcome::Cancelled => {
                    self.finish_cancelled(&mut machine);
                    return;
                }
                StreamOutcome::Fatal => return,
                StreamOutcome::Closed => {
                    if !self.driver.retry_on_error() {
                        // Peer-closed stream without retry terminates
                        // silently; termination is not an error.
                        tracing::debug!("stream closed, retry disabled");
                        return;
                    }
                    match self.backoff(&mut retry, &mut machine, &mut cancel_rx).await {
                        Flow::Continue => {}
                        Flow::Stop => return,
                    }
                }
            }
        }
    }

    /// Pump the active stream until teardown.
    async fn drive(
        &self,
        mut stream: BoxStream<'static, Result<D::Event, TransportError>>,
        retry: &mut RetryState,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> StreamOutcome {
        loop {
            tokio::select! {
                () = handle::cancelled(cancel_rx) => return StreamOutcome::Cancelled,
                item = stream.next() => match item {
                    Some(Ok(event)) => {
                        // Any received event proves the connection healthy,
                        // whether or not the router later filters it.
                        retry.record_event();
                        self.events.emit(LifecycleEvent::EventReceived);
                        self.driver.on_event(event, cancel_rx).await;
                    }
                    Some(Err(error)) => {
                        self.events.emit(LifecycleEvent::StreamError {
                            message: error.to_string(),
                        });
                        if self.driver.retry_on_error() {
                            tracing::warn!(%error, "stream error, reconnecting after teardown");
                            return StreamOutcome::Closed;
                        }
                        self.driver.on_fatal(error).await;
                        return StreamOutcome::Fatal;
                    }
                    None => {
                        self.events.emit(LifecycleEvent::StreamEnded);
                        tracing::debug!("stream ended by peer");
                        return StreamOutcome::Closed;
                    }
                }
            }
        }
    }

    /// Handle a failed attempt: surface it when retries are disabled,
    /// otherwise back off before the next attempt.
    async fn fail_or_backoff(
        &self,
        error: TransportError,
        retry: &mut RetryState,
        machine: &mut LifecycleMachine,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> Flow {
        if !self.driver.retry_on_error() {
            self.driver.on_fatal(error).await;
            return Flow::Stop;
        }
        self.backoff(retry, machine, cancel_rx).await
    }

    /// Sleep out the linear backoff delay, bailing out on cancellation.
    async fn backoff(
        &self,
        retry: &mut RetryState,
        machine: &mut LifecycleMachine,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> Flow {
        // The machine cannot be cancelled here; every cancellation path
        // returns before scheduling a reconnect.
        machine.stream_closed();

        let delay = retry.schedule(self.config.base_retry_timeout);
        self.events
            .emit(LifecycleEvent::ReconnectScheduled { delay });
        tracing::debug!(?delay, attempt = retry.attempt(), "reconnect scheduled");

        tokio::select! {
            () = handle::cancelled(cancel_rx) => {
                self.finish_cancelled(machine);
                Flow::Stop
            }
            () = tokio::time::sleep(delay) => {
                machine.reconnecting();
                Flow::Continue
            }
        }
    }

    fn finish_cancelled(&self, machine: &mut LifecycleMachine) {
        machine.cancel();
        self.events.emit(LifecycleEvent::Cancelled);
        tracing::debug!("subscription cancelled");
    }
}
