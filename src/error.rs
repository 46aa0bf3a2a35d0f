use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("login attempt failed with status [{status}] - {message}")]
    ClientError { status: u16, message: String },

    #[error("request failed: {0}")]
    RequestError(String),

    #[error("authentication failed: {0}")]
    AuthError(String),

    #[error("resolving [{host}] failed: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to persist credential to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
