//! HTTP middleware components.
//!
//! Provides bearer authentication and per-identity rate limiting.

pub mod bearer_auth;
pub mod rate_limit;

pub use bearer_auth::{BearerAuth, authenticate_bearer_token};
pub use rate_limit::{ClientId, RateLimitConfig, RateLimiter, client_identity};
