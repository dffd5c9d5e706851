use std::path::Path;

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use notesum::config::{Config, credential_from_env};

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show the effective configuration")]
    Show,
}

impl ConfigCommand {
    pub async fn execute(&self, config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ConfigSubcommand::Show => Self::show(&Config::load(config_path)?, format),
        }
    }

    fn show(config: &Config, format: OutputFormat) -> CliResult<()> {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Setting", "Value"]);

                for (key, value) in config_rows(config) {
                    table.add_row([key, value]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }
}

fn credential_status(env_var: &str) -> String {
    if credential_from_env(env_var).is_some() {
        format!("{env_var} (set)")
    } else {
        format!("{env_var} (not set)")
    }
}

fn config_rows(config: &Config) -> Vec<(String, String)> {
    let s = &config.summarizer;
    let openai = &config.providers.openai;
    let hf = &config.providers.huggingface;
    let server = &config.server;

    vec![
        ("summarizer.default_max_length".into(), s.default_max_length.to_string()),
        ("summarizer.min_input_chars".into(), s.min_input_chars.to_string()),
        ("summarizer.max_input_chars".into(), s.max_input_chars.to_string()),
        ("summarizer.provider_timeout_ms".into(), s.provider_timeout_ms.to_string()),
        ("summarizer.retry.max_attempts".into(), s.retry.max_attempts.to_string()),
        ("summarizer.retry.base_delay_ms".into(), s.retry.base_delay_ms.to_string()),
        ("summarizer.retry.max_delay_ms".into(), s.retry.max_delay_ms.to_string()),
        ("summarizer.extractive.max_candidates".into(), s.extractive.max_candidates.to_string()),
        ("summarizer.extractive.first_sentence_bonus".into(), s.extractive.first_sentence_bonus.to_string()),
        ("summarizer.extractive.last_sentence_bonus".into(), s.extractive.last_sentence_bonus.to_string()),
        ("providers.openai.api_url".into(), openai.api_url.clone()),
        ("providers.openai.model".into(), openai.model.clone()),
        ("providers.openai.api_key_env".into(), credential_status(&openai.api_key_env)),
        ("providers.huggingface.api_url".into(), hf.api_url.clone()),
        ("providers.huggingface.model".into(), hf.model.clone()),
        ("providers.huggingface.api_key_env".into(), credential_status(&hf.api_key_env)),
        ("server.listen_addr".into(), server.listen_addr.clone()),
        ("server.admin_token_env".into(), credential_status(&server.admin_token_env)),
        (
            "server.rate_limit".into(),
            format!("{} per {}s", server.rate_limit.max_requests, server.rate_limit.window_secs),
        ),
        (
            "server.cache".into(),
            if server.cache.enabled {
                format!("{} entries, {}s ttl", server.cache.max_entries, server.cache.ttl_secs)
            } else {
                "disabled".to_string()
            },
        ),
    ]
}
