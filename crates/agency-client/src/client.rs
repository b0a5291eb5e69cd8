//! Unary call wrappers around the agency transport.

use std::sync::Arc;

use agency_core::AgencyError;
use agency_core::config::ClientConfig;
use agency_core::events::LifecycleBus;
use agency_core::traits::{
    AgentService, MetaProvider, QuestionHandler, StatusHandler,
};
use agency_core::types::{
    Answer, CallMetadata, ClientId, CredDef, CredDefCreate, CredDefData, Invitation,
    InvitationBase, PingMsg, SaImplementation, Schema, SchemaCreate, SchemaData,
};
use agency_subscription::{ListenOptions, Subscriber, SubscriptionHandle};

/// Agency client: subscriptions plus unary pass-through calls.
///
/// There is no explicit close; dropping the client releases its
/// resources. Started subscriptions run in their own tasks and keep
/// going until their handles are cancelled.
pub struct AgentClient {
    agent: Arc<dyn AgentService>,
    provider: Arc<dyn MetaProvider>,
    subscriber: Subscriber,
}

impl AgentClient {
    /// Create a client, reading configuration from the environment.
    #[must_use]
    pub fn new(agent: Arc<dyn AgentService>, provider: Arc<dyn MetaProvider>) -> Self {
        Self::with_config(agent, provider, ClientConfig::from_env())
    }

    /// Create a client with explicit configuration.
    #[must_use]
    pub fn with_config(
        agent: Arc<dyn AgentService>,
        provider: Arc<dyn MetaProvider>,
        config: ClientConfig,
    ) -> Self {
        let subscriber = Subscriber::with_config(
            Arc::clone(&agent),
            Arc::clone(&provider),
            config,
        );
        Self {
            agent,
            provider,
            subscriber,
        }
    }

    /// Lifecycle event bus for this client's subscriptions.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleBus {
        self.subscriber.lifecycle()
    }

    /// Start the general status subscription.
    ///
    /// # Errors
    /// Returns a configuration error for inconsistent options, or an
    /// authentication error when metadata acquisition fails.
    pub async fn start_listening(
        &self,
        handler: Arc<dyn StatusHandler>,
        options: ListenOptions,
    ) -> Result<SubscriptionHandle, AgencyError> {
        self.subscriber.start_listening(handler, options).await
    }

    /// Start the question subscription.
    ///
    /// # Errors
    /// Returns an authentication error when metadata acquisition fails.
    pub async fn start_waiting(
        &self,
        handler: Arc<dyn QuestionHandler>,
    ) -> Result<SubscriptionHandle, AgencyError> {
        self.subscriber.start_waiting(handler).await
    }

    /// Answer a pushed question.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn give(&self, answer: &Answer) -> Result<ClientId, AgencyError> {
        tracing::debug!(question_id = %answer.id, "give answer");
        let meta = self.meta().await?;
        Ok(self.agent.give(answer, &meta).await?)
    }

    /// Create a connection invitation.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn create_invitation(
        &self,
        base: &InvitationBase,
    ) -> Result<Invitation, AgencyError> {
        tracing::debug!(label = %base.label, "create invitation");
        let meta = self.meta().await?;
        Ok(self.agent.create_invitation(base, &meta).await?)
    }

    /// Register the service-agent implementation.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn set_impl_id(
        &self,
        implementation: &SaImplementation,
    ) -> Result<SaImplementation, AgencyError> {
        tracing::debug!(id = %implementation.id, "set implementation");
        let meta = self.meta().await?;
        Ok(self.agent.set_impl_id(implementation, &meta).await?)
    }

    /// Ping the agency.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn ping(&self) -> Result<PingMsg, AgencyError> {
        tracing::debug!("ping");
        let meta = self.meta().await?;
        Ok(self.agent.ping(&PingMsg::default(), &meta).await?)
    }

    /// Create a schema on the ledger.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn create_schema(&self, create: &SchemaCreate) -> Result<Schema, AgencyError> {
        tracing::debug!(name = %create.name, "create schema");
        let meta = self.meta().await?;
        Ok(self.agent.create_schema(create, &meta).await?)
    }

    /// Create a credential definition on the ledger.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn create_cred_def(
        &self,
        create: &CredDefCreate,
    ) -> Result<CredDefData, AgencyError> {
        tracing::debug!(schema_id = %create.schema_id, "create cred def");
        let meta = self.meta().await?;
        Ok(self.agent.create_cred_def(create, &meta).await?)
    }

    /// Fetch schema data from the ledger.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn get_schema(&self, schema: &Schema) -> Result<SchemaData, AgencyError> {
        tracing::debug!(id = %schema.id, "get schema");
        let meta = self.meta().await?;
        Ok(self.agent.get_schema(schema, &meta).await?)
    }

    /// Fetch credential definition data from the ledger.
    ///
    /// # Errors
    /// Returns error if metadata acquisition or the call fails.
    pub async fn get_cred_def(&self, cred_def: &CredDef) -> Result<CredDefData, AgencyError> {
        tracing::debug!(id = %cred_def.id, "get cred def");
        let meta = self.meta().await?;
        Ok(self.agent.get_cred_def(cred_def, &meta).await?)
    }

    async fn meta(&self) -> Result<CallMetadata, AgencyError> {
        Ok(self.provider.meta().await?)
    }
}
