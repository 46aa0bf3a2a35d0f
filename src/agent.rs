use chrono::{DateTime, Utc};

use crate::auth::{AuthMethod, Session};
use crate::config::Config;
use crate::error::AgentError;
use crate::gate;
use crate::store::CredentialStore;

/// The renewal loop: sleep until the lease midpoint, wait for the server
/// to be resolvable, log in again, persist the refreshed pair.
pub struct Agent<A> {
    config: Config,
    auth: A,
    store: CredentialStore,
}

impl<A: AuthMethod> Agent<A> {
    pub fn new(config: Config, auth: A, store: CredentialStore) -> Self {
        Self {
            config,
            auth,
            store,
        }
    }

    /// Run until the first successful persistence (single-shot mode) or
    /// forever (agent mode). Returns an error only for the fatal cases:
    /// a non-transient resolver failure or a persistence failure.
    pub async fn run(&self) -> Result<(), AgentError> {
        let mut next_due = Utc::now();

        loop {
            sleep_until(next_due).await;
            gate::await_available(&self.config.host, self.config.port, self.config.retry_delay)
                .await?;

            let session = self.login_with_retry().await;

            // A successful login has already consumed the identity proof;
            // losing the credential here is worse than terminating loudly.
            self.store.persist(&session.token, &session.nonce)?;

            next_due = session.renewal_time(Utc::now());
            tracing::info!(
                "successfully retrieved credentials, valid until [{}], next renewal at [{}]",
                session.lease_end.to_rfc2822(),
                next_due.to_rfc2822()
            );

            if !self.config.agent {
                return Ok(());
            }
        }
    }

    // Availability is checked once per outer pass, not between attempts.
    // The nonce file is re-read on every attempt so each retry resumes
    // whatever session is on disk at that moment.
    async fn login_with_retry(&self) -> Session {
        loop {
            match self
                .auth
                .login(&self.config.base_url, self.store.nonce())
                .await
            {
                Ok(session) => return session,
                Err(err) => {
                    tracing::warn!(
                        "login attempt failed: {err}, retrying in {:?}",
                        self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }
}

async fn sleep_until(due: DateTime<Utc>) {
    // A due time in the past sleeps for zero, never backwards.
    let delay = (due - Utc::now()).to_std().unwrap_or_default();
    tokio::time::sleep(delay).await;
}
