use std::io;
use std::time::Duration;

use crate::error::AgentError;

/// Block until `host` resolves, polling every `retry_delay`.
///
/// A name that does not resolve yet usually means the server is mid-deploy
/// or not provisioned, so that case waits forever. Resolver failures that
/// point at malformed input are a configuration problem and surface
/// immediately. The resolved addresses are discarded; the HTTP client
/// re-resolves when it connects.
pub async fn await_available(
    host: &str,
    port: u16,
    retry_delay: Duration,
) -> Result<(), AgentError> {
    loop {
        match tokio::net::lookup_host((host, port)).await {
            Ok(mut addrs) => {
                if addrs.next().is_some() {
                    return Ok(());
                }
                tracing::info!("waiting for vault server to become available at [{host}]..");
                tokio::time::sleep(retry_delay).await;
            }
            Err(err) if is_transient(&err) => {
                tracing::info!("waiting for vault server to become available at [{host}]..");
                tokio::time::sleep(retry_delay).await;
            }
            Err(source) => {
                return Err(AgentError::Resolve {
                    host: host.to_string(),
                    source,
                });
            }
        }
    }
}

// getaddrinfo reports a name that does not (yet) exist as an uncategorized
// error; structural failures come back with a concrete kind.
fn is_transient(err: &io::Error) -> bool {
    !matches!(
        err.kind(),
        io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidData
            | io::ErrorKind::Unsupported
            | io::ErrorKind::PermissionDenied
    )
}
