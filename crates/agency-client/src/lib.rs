//! High-level agency client.
//!
//! [`AgentClient`] bundles the push-stream subscriptions from
//! `agency-subscription` with thin unary call wrappers. Every unary call
//! re-requests call metadata from the
//! [`MetaProvider`](agency_core::traits::MetaProvider) first, so rotating
//! tokens are picked up without caching.

pub mod client;

pub use client::AgentClient;

pub use agency_core::AgencyError;
pub use agency_subscription::{ListenOptions, SubscriptionHandle};
