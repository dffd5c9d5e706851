pub mod commands;
pub mod error;
pub mod output;

pub use commands::{ConfigCommand, HealthCommand, StatsCommand, SummarizeCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_percentage, format_timestamp, truncate_string};
