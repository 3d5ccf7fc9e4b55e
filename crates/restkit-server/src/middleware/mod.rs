//! Middlewares for [`Router`]s and layers for the outer `axum::Router`.
//!
//! Router middlewares are [`Middleware`] values applied in registration
//! order, the first one being the outermost:
//!
//! - [`recovery`]: converts panics into 500 envelopes
//! - [`logger`]: access log through `tracing`
//! - [`timeout`]: bounds request handling
//! - [`auth_guard`]: requires a valid access token
//!
//! [`RouterObservabilityExt`] adds request ids and HTTP tracing around the
//! whole application.
//!
//! [`Router`]: crate::routing::Router
//! [`Middleware`]: crate::routing::Middleware

mod auth_guard;
mod logger;
mod observability;
mod recovery;
mod timeout;

pub use self::auth_guard::auth_guard;
pub use self::logger::logger;
pub use self::observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use self::recovery::{Environment, RecoveryConfig, recovery};
pub use self::timeout::timeout;
