//! Core abstractions for the agency client.
//!
//! This crate provides the fundamental building blocks:
//! - Status, notification and protocol types pushed by the agency
//! - `LifecycleBus` - Broadcast channel for subscription lifecycle events
//! - `ClientConfig` - Process-level tunables
//! - Transport, metadata-provider and handler traits

pub mod config;
pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use config::ClientConfig;
pub use error::AgencyError;
pub use events::{LifecycleBus, LifecycleEvent};
pub use traits::{AgentService, MetaProvider, ProtocolService, QuestionHandler, StatusHandler};
pub use types::{AgentStatus, ListenStatus, Notification, ProtocolId, ProtocolStatus, Question};
