//! Messages pushed by and sent to the agency.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one logical subscription to the agency.
///
/// A fresh id is minted for every (re)connect attempt; the server uses it
/// to tell concurrent subscriptions of the same agent apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Mint a fresh random client id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// View the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Key/value call metadata attached to every agency call.
///
/// Fetched from the [`MetaProvider`](crate::traits::MetaProvider) before
/// each connect or unary call - never cached, since tokens may rotate.
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    entries: HashMap<String, String>,
}

impl CallMetadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying a bearer token in the `authorization` entry.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        let mut meta = Self::new();
        meta.insert("authorization", format!("Bearer {token}"));
        meta
    }

    /// Insert an entry, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Notification type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// No notification payload.
    #[default]
    None,
    /// A protocol instance advanced; richer status can be fetched.
    StatusUpdate,
    /// A running protocol is waiting for an action from us.
    ProtocolPaused,
    /// Stream liveness probe, carries no business meaning.
    Keepalive,
}

/// Protocol family tag, part of the correlation key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolType {
    #[default]
    None,
    DidExchange,
    Issue,
    Present,
    TrustPing,
    BasicMessage,
}

/// Our role in a protocol instance, part of the correlation key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolRole {
    #[default]
    Unknown,
    Initiator,
    Addressee,
    Resumer,
}

/// Notification envelope carried by an [`AgentStatus`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id.
    pub id: String,
    /// Type tag, drives filtering and routing.
    pub type_id: NotificationType,
    /// Pairwise connection this notification belongs to.
    pub connection_id: String,
    /// Protocol instance id, part of the correlation key.
    pub protocol_id: String,
    /// Protocol family, part of the correlation key.
    pub protocol_type: ProtocolType,
    /// Our role in the protocol, part of the correlation key.
    pub role: ProtocolRole,
    /// Server-side timestamp (Unix epoch nanoseconds).
    pub timestamp: i64,
}

impl Notification {
    /// Correlation key for fetching the richer protocol status.
    #[must_use]
    pub fn protocol_key(&self) -> ProtocolId {
        ProtocolId {
            id: self.protocol_id.clone(),
            type_id: self.protocol_type,
            role: self.role,
        }
    }
}

/// Raw status event pushed over the listen stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Subscription the event was pushed to.
    pub client_id: String,
    /// Notification envelope; absent envelopes are treated as empty.
    pub notification: Option<Notification>,
}

impl AgentStatus {
    /// The notification envelope, or an empty default when absent.
    #[must_use]
    pub fn notification(&self) -> Notification {
        self.notification.clone().unwrap_or_default()
    }
}

/// Correlation key identifying one protocol instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolId {
    /// Protocol instance id.
    pub id: String,
    /// Protocol family.
    pub type_id: ProtocolType,
    /// Our role in the instance.
    pub role: ProtocolRole,
}

/// Lifecycle state of a protocol instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    #[default]
    None,
    Running,
    WaitAction,
    /// Completed successfully; terminal, eligible for release.
    Completed,
    Failed,
}

impl ProtocolState {
    /// Whether no further progress notifications are expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Protocol-specific payload of a [`ProtocolStatus`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolPayload {
    #[default]
    None,
    /// Pairwise connection established via DID exchange.
    DidExchange {
        /// Connection id, matches the invitation id that initiated it.
        id: String,
        their_label: String,
    },
    /// Basic message received or sent on a connection.
    BasicMessage {
        content: String,
        sent_by_me: bool,
    },
}

/// Enriched status fetched for one correlation key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolStatus {
    /// Lifecycle state of the instance.
    pub state: ProtocolState,
    /// Protocol-specific result data.
    pub payload: ProtocolPayload,
}

impl ProtocolStatus {
    /// Whether the instance has reached its terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// Status delivered to a listen handler.
#[derive(Debug, Clone)]
pub struct ListenStatus {
    /// The raw pushed event.
    pub agent: AgentStatus,
    /// Correlated protocol status; `None` on the direct-delivery path.
    pub protocol: Option<ProtocolStatus>,
}

/// Question type tag for the waiting stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    None,
    AnswerNeededPing,
    IssuePropose,
    ProofPropose,
    ProofValues,
}

/// Question pushed over the wait stream, answered with [`Answer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Question {
    /// Status envelope carrying the originating notification.
    pub status: AgentStatus,
    /// What kind of answer the peer expects.
    pub type_id: QuestionType,
}

/// Answer to a pushed [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Id of the question being answered.
    pub id: String,
    /// Subscription the question arrived on.
    pub client_id: String,
    /// Positive or negative acknowledgement.
    pub ack: bool,
    /// Free-form info for the peer.
    pub info: String,
}

/// Parameters for creating an invitation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationBase {
    /// Label shown to the invitee.
    pub label: String,
    /// Caller-chosen invitation id; becomes the connection id.
    pub id: String,
}

/// A created invitation in both JSON and URL form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Invitation payload as JSON.
    pub json: String,
    /// URL form with the payload base64url-encoded in the query.
    pub url: String,
}

impl Invitation {
    /// Build an invitation from its JSON payload and a service endpoint.
    #[must_use]
    pub fn new(json: String, endpoint: &str) -> Self {
        let url = format!("{endpoint}?oob={}", BASE64_URL.encode(json.as_bytes()));
        Self { json, url }
    }

    /// Decode the payload embedded in the URL form.
    #[must_use]
    pub fn decode_url_payload(&self) -> Option<String> {
        let (_, encoded) = self.url.split_once("?oob=")?;
        let bytes = BASE64_URL.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }
}

/// Ping request/response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingMsg {
    pub id: i64,
    /// Set by the server when the agency is ready.
    pub ready: bool,
}

/// Service-agent implementation registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaImplementation {
    pub id: String,
    pub persistent: bool,
}

/// Parameters for creating a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCreate {
    pub name: String,
    pub version: String,
    pub attributes: Vec<String>,
}

/// Schema reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
}

/// Schema reference plus its ledger data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaData {
    pub id: String,
    pub data: String,
}

/// Parameters for creating a credential definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredDefCreate {
    pub schema_id: String,
    pub tag: String,
}

/// Credential definition reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredDef {
    pub id: String,
}

/// Credential definition reference plus its ledger data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredDefData {
    pub id: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_client_ids_are_unique() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn missing_notification_defaults_to_none_type() {
        let status = AgentStatus::default();
        assert_eq!(status.notification().type_id, NotificationType::None);
    }

    #[test]
    fn protocol_key_copies_correlation_fields() {
        let notification = Notification {
            protocol_id: "prot-1".into(),
            protocol_type: ProtocolType::DidExchange,
            role: ProtocolRole::Addressee,
            ..Notification::default()
        };
        let key = notification.protocol_key();
        assert_eq!(key.id, "prot-1");
        assert_eq!(key.type_id, ProtocolType::DidExchange);
        assert_eq!(key.role, ProtocolRole::Addressee);
    }

    #[test]
    fn only_completed_state_is_terminal() {
        assert!(ProtocolState::Completed.is_terminal());
        assert!(!ProtocolState::Running.is_terminal());
        assert!(!ProtocolState::Failed.is_terminal());
    }

    #[test]
    fn invitation_url_embeds_payload() {
        let json = r#"{"@id":"abc-123"}"#;
        let invitation = Invitation::new(json.to_string(), "https://agency.example.com/invite");
        assert!(invitation.url.starts_with("https://agency.example.com/invite?oob="));
        assert_eq!(invitation.decode_url_payload().as_deref(), Some(json));
    }

    #[test]
    fn bearer_metadata_sets_authorization() {
        let meta = CallMetadata::bearer("tok");
        assert_eq!(meta.get("authorization"), Some("Bearer tok"));
    }
}
