pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub use toml_config::MenuConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "canteen-menu")]
#[command(about = "Weekly canteen menu, decoded from the published sheets")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults are used when absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the website URL or local mirror directory
    #[arg(long)]
    pub base_url: Option<String>,

    /// Evaluate "now" at this RFC 3339 timestamp instead of the wall clock
    #[arg(long)]
    pub at: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every published week without fetching the sheets
    Weeks,
    /// Print the nearest week with all its days
    Week,
    /// Print the nearest day of the nearest week
    Day,
    /// Print the sheet link of the nearest week
    Link,
}
