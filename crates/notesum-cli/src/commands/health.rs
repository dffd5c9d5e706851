use clap::Parser;
use notesum::config::Config;
use notesum::summarizer::{HealthReport, HealthStatus};

use crate::commands::fetch_admin;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct HealthCommand {
    #[clap(long, help = "Server base URL (defaults to the configured listen address)")]
    pub url: Option<String>,
}

impl HealthCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let report: HealthReport =
            fetch_admin(config, self.url.as_deref(), "/admin/health").await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Table => {
                let status = match report.status {
                    HealthStatus::Healthy => "healthy",
                    HealthStatus::Unhealthy => "UNHEALTHY",
                };
                println!("Provider: {}", report.provider);
                println!("Status:   {status}");
                if let Some(error) = &report.error {
                    println!("Error:    {error}");
                }
            }
        }

        if report.is_healthy() {
            Ok(())
        } else {
            Err(format!("Provider {} is unhealthy", report.provider).into())
        }
    }
}
