//! Linear reconnect backoff.

use std::time::Duration;

/// Consecutive reconnect attempts since the last received stream event.
///
/// The delay before attempt N is `N * base`; the first retry fires
/// immediately. There is no attempt cap, so the computation saturates
/// instead of overflowing at very large counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    /// Fresh state with no recorded attempts.
    #[must_use]
    pub const fn new() -> Self {
        Self { attempt: 0 }
    }

    /// Current consecutive attempt count.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// A stream event arrived; the connection is healthy again.
    pub const fn record_event(&mut self) {
        self.attempt = 0;
    }

    /// Delay before the next reconnect, advancing the attempt count.
    pub fn schedule(&mut self, base: Duration) -> Duration {
        let delay = base.saturating_mul(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_secs(5);

    #[test]
    fn first_retry_is_immediate() {
        let mut retry = RetryState::new();
        assert_eq!(retry.schedule(BASE), Duration::ZERO);
    }

    #[test]
    fn delay_grows_linearly() {
        let mut retry = RetryState::new();
        retry.schedule(BASE);
        assert_eq!(retry.schedule(BASE), BASE);
        assert_eq!(retry.schedule(BASE), BASE * 2);
        assert_eq!(retry.schedule(BASE), BASE * 3);
    }

    #[test]
    fn received_event_resets_the_count() {
        let mut retry = RetryState::new();
        retry.schedule(BASE);
        retry.schedule(BASE);
        retry.record_event();
        assert_eq!(retry.attempt(), 0);
        assert_eq!(retry.schedule(BASE), Duration::ZERO);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let mut retry = RetryState { attempt: u32::MAX };
        let delay = retry.schedule(Duration::MAX);
        assert_eq!(delay, Duration::MAX);
        assert_eq!(retry.attempt(), u32::MAX);
    }
}
