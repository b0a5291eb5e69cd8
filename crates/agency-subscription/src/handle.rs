//! Externally visible handle for one active subscription.

use tokio::sync::watch;

use agency_core::types::ClientId;

/// Handle for one active logical subscription.
///
/// Dropping the handle does not cancel the subscription; cancellation is
/// explicit. [`cancel`](Self::cancel) is idempotent: it tears down the
/// live stream, clears any pending reconnect timer and prevents further
/// handler invocations, including from in-flight correlated fetches.
#[derive(Debug)]
pub struct SubscriptionHandle {
    client_id: ClientId,
    cancel_tx: watch::Sender<bool>,
}

impl SubscriptionHandle {
    pub(crate) fn new(client_id: ClientId) -> (Self, watch::Receiver<bool>) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = Self {
            client_id,
            cancel_tx,
        };
        (handle, cancel_rx)
    }

    /// Identity of the first connect attempt.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Cancel the subscription. Safe to call any number of times.
    pub fn cancel(&self) {
        // send_replace rather than send: cancellation must stick even
        // after the subscription task has exited and dropped its receiver.
        self.cancel_tx.send_replace(true);
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

/// Wait until cancellation is requested.
///
/// A dropped, never-cancelled handle closes the channel without setting
/// the flag; that must not complete this future, since dropping the
/// handle does not cancel the subscription.
pub(crate) async fn cancelled(rx: &mut watch::Receiver<bool>) {
    // wait_for also covers a flag set before we started waiting.
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Whether cancellation has been requested.
pub(crate) fn is_cancelled(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow()
}
