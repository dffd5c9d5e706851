use std::io::Read;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use notesum::config::Config;
use notesum::{SummarizeOptions, Summarizer, SummaryStyle};

use crate::error::CliResult;
use crate::output::{OutputFormat, format_timestamp};

#[derive(Parser)]
pub struct SummarizeCommand {
    #[clap(help = "Note file to summarize (reads stdin when omitted)")]
    pub file: Option<PathBuf>,

    #[clap(long, short, help = "Target summary length (defaults to the configured value)")]
    pub max_length: Option<usize>,

    #[clap(
        long,
        short,
        default_value = "concise",
        help = "Summary style (concise, bullet, detailed)"
    )]
    pub style: SummaryStyle,
}

impl SummarizeCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let text = self.read_input()?;

        let summarizer = Summarizer::from_config(config);
        let mut options = SummarizeOptions::new()
            .with_style(self.style)
            .with_requester("notesum-cli");
        if let Some(max_length) = self.max_length {
            options = options.with_max_length(max_length);
        }

        let result = summarizer.summarize(&text, &options).await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Table => {
                println!("{}\n", result.summary);

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Provider", "Words", "Original Length", "Summarized"]);
                table.add_row([
                    result.provider.as_str(),
                    &result.word_count.to_string(),
                    &result.original_length.to_string(),
                    &format_timestamp(&Utc::now()),
                ]);

                println!("{table}");
            }
        }

        Ok(())
    }

    fn read_input(&self) -> CliResult<String> {
        match &self.file {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                format!("Failed to read {}: {e}", path.display()).into()
            }),
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}
