//! Request extractors.
//!
//! - [`AuthUser`]: the caller authenticated by the auth guard
//! - [`ValidateJson`]: JSON body deserialized and validated

mod auth;
mod json;

pub use crate::extract::auth::AuthUser;
pub use crate::extract::json::ValidateJson;
