//! Per-subscription lifecycle state machine.
//!
//! The stream observers (data, error, end) are modeled as transitions of an
//! explicit machine instead of independent callbacks over shared counters;
//! `Cancelled` is absorbing.

/// Lifecycle state of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Acquiring identity/metadata or establishing the stream.
    Connecting,
    /// Stream established, events flowing.
    Active,
    /// Stream torn down, a reconnect timer is pending.
    ReconnectScheduled,
    /// Cancelled by the caller; no further transitions.
    Cancelled,
}

/// Drives the subscription lifecycle; every transition method returns
/// whether the transition took effect, which is false exactly when the
/// machine is already cancelled.
#[derive(Debug)]
pub struct LifecycleMachine {
    state: SubscriptionState,
}

impl LifecycleMachine {
    /// New machine, starting in `Connecting`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SubscriptionState::Connecting,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SubscriptionState {
        self.state
    }

    /// The stream was established.
    pub const fn established(&mut self) -> bool {
        self.transition(SubscriptionState::Active)
    }

    /// The stream was torn down and a reconnect will be scheduled.
    pub const fn stream_closed(&mut self) -> bool {
        self.transition(SubscriptionState::ReconnectScheduled)
    }

    /// The backoff delay elapsed; a new attempt is starting.
    pub const fn reconnecting(&mut self) -> bool {
        self.transition(SubscriptionState::Connecting)
    }

    /// Cancel the subscription. Returns false when already cancelled,
    /// making repeated cancellation a no-op.
    pub const fn cancel(&mut self) -> bool {
        self.transition(SubscriptionState::Cancelled)
    }

    const fn transition(&mut self, next: SubscriptionState) -> bool {
        if matches!(self.state, SubscriptionState::Cancelled) {
            return false;
        }
        self.state = next;
        true
    }
}

impl Default for LifecycleMachine {
    fn default() -> Self {
        Self::new()
    }
}
