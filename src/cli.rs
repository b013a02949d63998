//! Command-line interface definitions for News Window.
//!
//! The job normally runs with no arguments; everything here is an optional
//! override, and most can also come from the environment.

use chrono::NaiveDateTime;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # The daily run
/// news_window
///
/// # Rebuild an earlier day's sheet
/// news_window --now "2025-06-12 10:00"
///
/// # See what would be published
/// news_window --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML file overriding the built-in configuration
    #[arg(short, long, env = "NEWS_WINDOW_CONFIG")]
    pub config: Option<String>,

    /// Spreadsheet holding the source, template and output sheets
    #[arg(long, env = "NEWS_WINDOW_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Run as of this civil time (`YYYY-MM-DD HH:MM`) instead of the clock
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Extract and report without touching the destination sheet
    #[arg(long)]
    pub dry_run: bool,

    /// Sheets API credential: service-account key JSON, bearer token, or JSON with `access_token`
    #[arg(long, env = "GOOGLE_SHEETS_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Bearer token for the sentiment model endpoint
    #[arg(long, env = "SENTIMENT_API_TOKEN", hide_env_values = true)]
    pub sentiment_token: Option<String>,
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| format!("expected YYYY-MM-DD HH:MM: {e}"))
}
