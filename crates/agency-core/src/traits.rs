//! Trait contracts between the subscription core and its collaborators.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::types::{
    AgentStatus, Answer, CallMetadata, ClientId, CredDef, CredDefCreate, CredDefData, Invitation,
    InvitationBase, ListenStatus, PingMsg, ProtocolId, ProtocolStatus, Question, SaImplementation,
    Schema, SchemaCreate, SchemaData,
};

/// Authentication error while acquiring call metadata.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),
    #[error("Credentials rejected: {0}")]
    Rejected(String),
}

/// Transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    Connect(String),
    #[error("Stream failed: {0}")]
    Stream(String),
    #[error("Call failed: {0}")]
    Call(String),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Server-push stream of raw status events. Dropping the stream cancels it.
pub type StatusStream = BoxStream<'static, Result<AgentStatus, TransportError>>;

/// Server-push stream of questions. Dropping the stream cancels it.
pub type QuestionStream = BoxStream<'static, Result<Question, TransportError>>;

/// Supplies per-subscription identity and per-call metadata.
#[async_trait]
pub trait MetaProvider: Send + Sync {
    /// Fresh client identity for one (re)connect attempt.
    fn client_id(&self) -> ClientId;

    /// Call metadata for the next call.
    ///
    /// Re-requested before every connect and unary call; tokens may rotate.
    ///
    /// # Errors
    /// Returns error if the token round trip fails.
    async fn meta(&self) -> Result<CallMetadata, AuthError>;
}

/// Transport-level agency operations.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Open the status push stream for one subscription.
    ///
    /// # Errors
    /// Returns error if the stream cannot be established.
    async fn listen(
        &self,
        client_id: &ClientId,
        meta: &CallMetadata,
    ) -> Result<StatusStream, TransportError>;

    /// Open the question push stream for one subscription.
    ///
    /// # Errors
    /// Returns error if the stream cannot be established.
    async fn wait(
        &self,
        client_id: &ClientId,
        meta: &CallMetadata,
    ) -> Result<QuestionStream, TransportError>;

    /// Answer a pushed question.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn give(&self, answer: &Answer, meta: &CallMetadata)
    -> Result<ClientId, TransportError>;

    /// Create a connection invitation.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn create_invitation(
        &self,
        base: &InvitationBase,
        meta: &CallMetadata,
    ) -> Result<Invitation, TransportError>;

    /// Register the service-agent implementation.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn set_impl_id(
        &self,
        implementation: &SaImplementation,
        meta: &CallMetadata,
    ) -> Result<SaImplementation, TransportError>;

    /// Liveness probe.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn ping(&self, msg: &PingMsg, meta: &CallMetadata) -> Result<PingMsg, TransportError>;

    /// Create a schema on the ledger.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn create_schema(
        &self,
        create: &SchemaCreate,
        meta: &CallMetadata,
    ) -> Result<Schema, TransportError>;

    /// Create a credential definition on the ledger.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn create_cred_def(
        &self,
        create: &CredDefCreate,
        meta: &CallMetadata,
    ) -> Result<CredDefData, TransportError>;

    /// Fetch schema data from the ledger.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn get_schema(
        &self,
        schema: &Schema,
        meta: &CallMetadata,
    ) -> Result<SchemaData, TransportError>;

    /// Fetch credential definition data from the ledger.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn get_cred_def(
        &self,
        cred_def: &CredDef,
        meta: &CallMetadata,
    ) -> Result<CredDefData, TransportError>;
}

/// Correlated-status service keyed by [`ProtocolId`].
///
/// May be shared across subscriptions; implementations must tolerate
/// concurrent independent requests.
#[async_trait]
pub trait ProtocolService: Send + Sync {
    /// Fetch the enriched status for one protocol instance.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn status(&self, id: &ProtocolId) -> Result<ProtocolStatus, TransportError>;

    /// Release the server-side resources of a terminal protocol instance.
    ///
    /// # Errors
    /// Returns error if the call fails.
    async fn release(&self, id: &ProtocolId) -> Result<(), TransportError>;
}

/// Caller-supplied handler for the listen stream.
#[async_trait]
pub trait StatusHandler: Send + Sync {
    /// A delivered, possibly enriched, status.
    async fn on_status(&self, status: ListenStatus);

    /// A terminal non-retried stream error; invoked at most once.
    async fn on_error(&self, error: TransportError);
}

/// Caller-supplied handler for the wait stream. No error channel:
/// stream failures are swallowed and retried internally.
#[async_trait]
pub trait QuestionHandler: Send + Sync {
    /// A pushed question.
    async fn on_question(&self, question: Question);
}
