//! Filters noise notifications and routes the rest.

use agency_core::types::{AgentStatus, NotificationType, ProtocolId};

use crate::options::ListenOptions;

/// Routing decision for one raw status event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Deliver the raw status with an empty correlated slot.
    Deliver,
    /// Fetch the correlated protocol status before delivery.
    Fetch(ProtocolId),
    /// Discard without delivery.
    Drop,
}

/// Decide what to do with one raw status event. Rules apply in order:
/// keepalive filtering first, then correlation, then direct delivery.
#[must_use]
pub fn route(status: &AgentStatus, options: &ListenOptions) -> Routing {
    let notification = status.notification();
    if options.filter_keepalive && notification.type_id == NotificationType::Keepalive {
        return Routing::Drop;
    }
    if options.auto_protocol_status && notification.type_id == NotificationType::StatusUpdate {
        return Routing::Fetch(notification.protocol_key());
    }
    Routing::Deliver
}

#[cfg(test)]
mod tests {
    use super::*;

    use agency_core::types::{Notification, ProtocolRole, ProtocolType};

    fn status(type_id: NotificationType) -> AgentStatus {
        AgentStatus {
            client_id: "client".into(),
            notification: Some(Notification {
                type_id,
                protocol_id: "prot-1".into(),
                protocol_type: ProtocolType::DidExchange,
                role: ProtocolRole::Initiator,
                ..Notification::default()
            }),
        }
    }

    #[test]
    fn keepalive_is_dropped_when_filtering() {
        let options = ListenOptions::default();
        assert_eq!(
            route(&status(NotificationType::Keepalive), &options),
            Routing::Drop
        );
    }

    #[test]
    fn keepalive_is_delivered_when_not_filtering() {
        let options = ListenOptions {
            filter_keepalive: false,
            ..ListenOptions::default()
        };
        assert_eq!(
            route(&status(NotificationType::Keepalive), &options),
            Routing::Deliver
        );
    }

    #[test]
    fn status_update_fetches_with_correlation_enabled() {
        let options = ListenOptions {
            auto_protocol_status: true,
            ..ListenOptions::default()
        };
        let routing = route(&status(NotificationType::StatusUpdate), &options);
        let Routing::Fetch(key) = routing else {
            panic!("expected fetch, got {routing:?}");
        };
        assert_eq!(key.id, "prot-1");
        assert_eq!(key.type_id, ProtocolType::DidExchange);
        assert_eq!(key.role, ProtocolRole::Initiator);
    }

    #[test]
    fn status_update_delivers_directly_without_correlation() {
        let options = ListenOptions::default();
        assert_eq!(
            route(&status(NotificationType::StatusUpdate), &options),
            Routing::Deliver
        );
    }

    #[test]
    fn missing_envelope_delivers_directly() {
        let options = ListenOptions {
            auto_protocol_status: true,
            ..ListenOptions::default()
        };
        let bare = AgentStatus::default();
        assert_eq!(route(&bare, &options), Routing::Deliver);
    }
}
