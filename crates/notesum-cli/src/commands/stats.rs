use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use notesum::config::Config;
use notesum::summarizer::ProviderStats;

use crate::commands::fetch_admin;
use crate::error::CliResult;
use crate::output::{OutputFormat, format_percentage};

#[derive(Parser)]
pub struct StatsCommand {
    #[clap(long, help = "Server base URL (defaults to the configured listen address)")]
    pub url: Option<String>,
}

impl StatsCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let stats: ProviderStats = fetch_admin(config, self.url.as_deref(), "/admin/stats").await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            OutputFormat::Table => {
                println!("Notesum Statistics");
                println!("==================\n");

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Metric", "Value"]);

                table.add_row(["Current provider", stats.current_provider.as_str()]);
                table.add_row(["Requests", &stats.request_count.to_string()]);
                table.add_row(["Provider failures", &stats.error_count.to_string()]);
                table.add_row(["Success rate", &format_percentage(stats.success_rate)]);

                println!("{table}");
            }
        }

        Ok(())
    }
}
