mod ec2;
mod session;

pub use ec2::Ec2Auth;
pub use session::{Session, midpoint};

use async_trait::async_trait;

use crate::error::AgentError;

/// Trait for login backends
///
/// One call maps to exactly one login request/response exchange; retry
/// policy belongs to the caller.
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// Perform a login (or a nonce re-login) against `base_url`.
    async fn login(&self, base_url: &str, nonce: Option<String>) -> Result<Session, AgentError>;
}
