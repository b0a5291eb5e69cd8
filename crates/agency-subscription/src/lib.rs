//! Streaming subscription and correlation manager.
//!
//! Opens server-push streams against the agency, survives transient
//! failures with linear backoff, filters noise notifications and, when
//! configured, enriches status updates with a correlated protocol-status
//! fetch before delivery.
//!
//! Entry point is [`Subscriber`]: [`Subscriber::start_listening`] for the
//! general status stream and [`Subscriber::start_waiting`] for the
//! question stream. Both return a [`SubscriptionHandle`] whose
//! [`cancel`](SubscriptionHandle::cancel) stops the live stream and any
//! pending reconnect.

pub mod controller;
pub mod fetcher;
pub mod handle;
pub mod options;
pub mod retry;
pub mod router;
pub mod state;
pub mod subscriber;

pub use handle::SubscriptionHandle;
pub use options::ListenOptions;
pub use router::Routing;
pub use state::SubscriptionState;
pub use subscriber::Subscriber;
