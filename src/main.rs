use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vault_ec2_agent::{Agent, Cli, Config, CredentialStore, Ec2Auth};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::resolve(Cli::parse()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let http = match config.http_client() {
        Ok(http) => http,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let auth = Ec2Auth::new(http, config.mount.as_str(), config.role.as_str());
    let store = CredentialStore::new(config.token_path.clone(), config.nonce_path.clone());

    match Agent::new(config, auth, store).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
