//! Token lifecycle: configuration, signing, verification and pair orchestration.
//!
//! Three token kinds exist, each with its own issuer, secret and lifetime:
//!
//! - **id**: identifies the user to the client
//! - **access**: authorizes requests to protected routes
//! - **refresh**: exchanges for a fresh access/refresh pair
//!
//! [`TokenManager`] is the entry point for handlers. Pair operations run the
//! access and refresh legs on two blocking tasks and join them, see
//! [`fork_join`].

pub mod codec;
mod config;
mod error;
pub mod fork_join;
mod manager;

pub use self::codec::{Claims, SignedToken};
pub use self::config::{TokenConfig, TokenConfigs, TokenKind, TokenSecret, TokenSource};
pub use self::error::{TokenError, TokenResult};
pub use self::manager::{AuthTokenPair, IdToken, TokenManager};
