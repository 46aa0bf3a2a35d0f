use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use directories::UserDirs;
use url::Url;

use crate::error::AgentError;

/// Every outbound call shares one overall timeout; a hung call becomes a
/// transport error and goes through the normal retry path.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(
    name = "vault-ec2-agent",
    version,
    about = "Authenticates an EC2 host to Vault and keeps the issued token fresh"
)]
pub struct Cli {
    /// Full URL of the Vault node to authenticate against
    #[arg(long = "vault-url", default_value = "https://vault.service.consul:8200")]
    pub vault_url: String,

    /// Vault role to request
    #[arg(long)]
    pub role: String,

    /// AWS auth mount path
    #[arg(long = "aws-mount", default_value = "aws-ec2")]
    pub aws_mount: String,

    /// Path to the nonce file [default: ~/.vault-nonce]
    #[arg(long = "nonce-path")]
    pub nonce_path: Option<PathBuf>,

    /// Path to the token file [default: ~/.vault-token]
    #[arg(long = "token-path")]
    pub token_path: Option<PathBuf>,

    /// Keep running and renew the token before each lease expires
    #[arg(long)]
    pub agent: bool,

    /// Seconds between retries of failed login attempts
    #[arg(long = "retry-delay", default_value_t = 30)]
    pub retry_delay: u64,

    /// Certificate validation towards the Vault server
    #[arg(long = "tls-mode", value_enum, default_value = "verify")]
    pub tls_mode: TlsMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TlsMode {
    /// Strict certificate validation
    Verify,
    /// Accept any certificate. Trust-on-first-use compromise for hosts that
    /// come up before the server's certificate chain is provisioned.
    BootstrapInsecure,
}

/// Resolved process-lifetime configuration, built once at startup and
/// passed into each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub mount: String,
    pub role: String,
    pub token_path: PathBuf,
    pub nonce_path: PathBuf,
    pub agent: bool,
    pub retry_delay: Duration,
    pub tls_mode: TlsMode,
}

impl Config {
    pub fn resolve(cli: Cli) -> Result<Self, AgentError> {
        let url = Url::parse(&cli.vault_url)
            .map_err(|e| AgentError::Config(format!("invalid vault url {:?}: {e}", cli.vault_url)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AgentError::Config(format!("vault url {:?} has no host", cli.vault_url)))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(8200);

        let home = |name: &str| -> Result<PathBuf, AgentError> {
            let dirs = UserDirs::new()
                .ok_or_else(|| AgentError::Config("cannot determine home directory".to_string()))?;
            Ok(dirs.home_dir().join(name))
        };
        let token_path = match cli.token_path {
            Some(path) => path,
            None => home(".vault-token")?,
        };
        let nonce_path = match cli.nonce_path {
            Some(path) => path,
            None => home(".vault-nonce")?,
        };

        Ok(Self {
            base_url: cli.vault_url.trim_end_matches('/').to_string(),
            host,
            port,
            mount: cli.aws_mount,
            role: cli.role,
            token_path,
            nonce_path,
            agent: cli.agent,
            retry_delay: Duration::from_secs(cli.retry_delay),
            tls_mode: cli.tls_mode,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client, AgentError> {
        let insecure = self.tls_mode == TlsMode::BootstrapInsecure;
        if insecure {
            tracing::warn!("certificate validation is disabled (--tls-mode bootstrap-insecure)");
        }

        reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build http client: {e}")))
    }
}
