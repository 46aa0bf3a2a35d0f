//! vault-ec2-agent - keeps a Vault token issued to an EC2 host fresh
//!
//! Authenticates with the instance-identity PKCS7 document, persists the
//! issued token and the reusable auth nonce to flat files, and logs in
//! again at the midpoint of each lease. Re-login submits the persisted
//! nonce so the host resumes the same logical session.

mod agent;
mod auth;
mod config;
mod error;
mod gate;
mod store;

pub use agent::Agent;
pub use auth::{AuthMethod, Ec2Auth, Session, midpoint};
pub use config::{Cli, Config, TlsMode};
pub use error::AgentError;
pub use gate::await_available;
pub use store::CredentialStore;
