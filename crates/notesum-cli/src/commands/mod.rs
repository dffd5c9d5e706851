pub mod config;
pub mod health;
pub mod stats;
pub mod summarize;

pub use config::ConfigCommand;
pub use health::HealthCommand;
pub use stats::StatsCommand;
pub use summarize::SummarizeCommand;

use notesum::config::{Config, credential_from_env};
use serde::de::DeserializeOwned;

use crate::error::{CliError, CliResult};

/// Base URL of the server described by `config`
pub fn default_server_url(config: &Config) -> String {
    format!("http://{}", config.server.listen_addr)
}

/// GET an admin endpoint of a running server, authenticating with the token
/// from the environment variable named in the config
pub async fn fetch_admin<T: DeserializeOwned>(
    config: &Config,
    url: Option<&str>,
    path: &str,
) -> CliResult<T> {
    let token_env = &config.server.admin_token_env;
    let token = credential_from_env(token_env).ok_or_else(|| {
        CliError(format!(
            "Admin token not set. Export {token_env} with the server's admin token."
        ))
    })?;

    let base = url
        .map(str::to_string)
        .unwrap_or_else(|| default_server_url(config));
    let endpoint = format!("{}{}", base.trim_end_matches('/'), path);
    tracing::debug!("GET {endpoint}");

    let response = reqwest::Client::new()
        .get(&endpoint)
        .header("x-admin-token", token)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("request failed")
            .to_string();
        return Err(format!("{endpoint} returned {status}: {message}").into());
    }

    Ok(response.json().await?)
}
