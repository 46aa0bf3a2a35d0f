use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthMethod, Session};
use crate::error::AgentError;

const EC2_IDENTITY_ENDPOINT: &str =
    "http://169.254.169.254/latest/dynamic/instance-identity/pkcs7";

/// EC2 instance-identity authentication
pub struct Ec2Auth {
    http: reqwest::Client,
    mount: String,
    role: String,
    metadata_url: String,
}

impl Ec2Auth {
    pub fn new(http: reqwest::Client, mount: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            http,
            mount: mount.into(),
            role: role.into(),
            metadata_url: EC2_IDENTITY_ENDPOINT.to_string(),
        }
    }

    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Fetch the signed instance-identity document from the metadata
    /// service. The body is forwarded verbatim, never parsed, and is read
    /// even on a non-2xx status since the raw bytes still help diagnostics.
    async fn fetch_identity_proof(&self) -> Result<String, AgentError> {
        let response = self
            .http
            .get(&self.metadata_url)
            .send()
            .await
            .map_err(|e| AgentError::RequestError(format!("identity document fetch: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| AgentError::RequestError(format!("identity document read: {e}")))
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    role: &'a str,
    pkcs7: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: AuthData,
}

#[derive(Deserialize)]
struct AuthData {
    client_token: String,
    lease_duration: u64,
    #[serde(default)]
    metadata: AuthMetadata,
}

#[derive(Deserialize, Default)]
struct AuthMetadata {
    #[serde(default)]
    nonce: String,
}

#[async_trait]
impl AuthMethod for Ec2Auth {
    async fn login(&self, base_url: &str, nonce: Option<String>) -> Result<Session, AgentError> {
        let pkcs7 = self.fetch_identity_proof().await?;

        // The server infers login vs. re-login from the nonce field alone,
        // so an absent nonce must be omitted from the body entirely.
        let url = format!("{}/v1/auth/{}/login", base_url, self.mount);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                role: &self.role,
                pkcs7: &pkcs7,
                nonce,
            })
            .send()
            .await
            .map_err(|e| AgentError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::ClientError {
                status: status.as_u16(),
                message,
            });
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AgentError::AuthError(format!("invalid login response: {e}")))?;

        Ok(Session {
            token: login.auth.client_token,
            nonce: login.auth.metadata.nonce,
            lease_end: Utc::now() + TimeDelta::seconds(login.auth.lease_duration as i64),
        })
    }
}
