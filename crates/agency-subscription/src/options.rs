//! Per-subscription options, read once at subscription start.

use std::sync::Arc;

use agency_core::AgencyError;
use agency_core::traits::ProtocolService;

/// Options for one listen subscription.
#[derive(Clone)]
pub struct ListenOptions {
    /// Reconnect with linear backoff on stream errors and peer-closed
    /// streams. When false the first stream error is surfaced once to the
    /// handler and the subscription stops.
    pub retry_on_error: bool,
    /// Drop keepalive notifications before they reach the handler.
    pub filter_keepalive: bool,
    /// Release terminal protocol instances after delivering their status.
    pub auto_release: bool,
    /// Enrich status updates with a correlated protocol-status fetch.
    pub auto_protocol_status: bool,
    /// Correlated-status service; required when `auto_protocol_status`
    /// is set.
    pub protocol: Option<Arc<dyn ProtocolService>>,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            retry_on_error: true,
            filter_keepalive: true,
            auto_release: false,
            auto_protocol_status: false,
            protocol: None,
        }
    }
}

impl std::fmt::Debug for ListenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenOptions")
            .field("retry_on_error", &self.retry_on_error)
            .field("filter_keepalive", &self.filter_keepalive)
            .field("auto_release", &self.auto_release)
            .field("auto_protocol_status", &self.auto_protocol_status)
            .field("protocol", &self.protocol.is_some())
            .finish()
    }
}

impl ListenOptions {
    /// Options with correlation and auto-release enabled.
    #[must_use]
    pub fn with_protocol(protocol: Arc<dyn ProtocolService>) -> Self {
        Self {
            auto_protocol_status: true,
            protocol: Some(protocol),
            ..Self::default()
        }
    }

    /// Check option consistency before any network call.
    ///
    /// # Errors
    /// Returns a configuration error when correlation is requested without
    /// a protocol service.
    pub fn validate(&self) -> Result<(), AgencyError> {
        if self.auto_protocol_status && self.protocol.is_none() {
            return Err(AgencyError::Config(
                "set a valid protocol service when using auto protocol status".into(),
            ));
        }
        Ok(())
    }
}
