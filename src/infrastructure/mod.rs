//! Infrastructure Layer
//!
//! Cross-cutting concerns and infrastructure components.

pub mod retry;

pub use retry::{retry_until, RetryDecision, RetryTimeout};
