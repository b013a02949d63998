//! # News Window
//!
//! A daily batch job that gathers scraped news rows from per-provider source
//! sheets, keeps the ones published between yesterday 15:00 and today 15:00,
//! optionally labels them with a sentiment and category, and publishes the
//! batch as a fresh sheet named after the run date.
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_SHEETS_CREDENTIALS=ya29... news_window
//! ```
//!
//! ## Architecture
//!
//! 1. **Window**: derive `[yesterday 15:00, today 15:00)` from the run time
//! 2. **Extraction**: read MSN, Google and Yahoo in order; normalize dates,
//!    filter by window, classify titles
//! 3. **Publish**: delete today's sheet if present, copy the template, bulk
//!    write the rows

use chrono::NaiveDateTime;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classify;
mod cli;
mod config;
mod dates;
mod errors;
mod extract;
mod models;
mod outputs;
mod pipeline;
mod sheets;
mod utils;
mod window;

use classify::{HttpSentimentModel, KeywordClassifier, ModelClassifier};
use cli::Cli;
use config::{ClassifierMode, Config};
use errors::DestinationWriteError;
use pipeline::RunReport;
use sheets::GoogleSheets;
use sheets::auth::resolve_token;
use utils::civil_now;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_window starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.now, args.dry_run, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration rejected");
            return Err(e.into());
        }
    };
    if let Some(id) = args.spreadsheet_id.clone() {
        config.spreadsheet_id = id;
    }
    info!(
        spreadsheet_id = %config.spreadsheet_id,
        sources = ?config.sources,
        classifier = ?config.classifier,
        "Configuration ready"
    );

    // ---- Collaborators ----
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let token = match resolve_token(&client, args.credentials.as_deref()).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "No usable Sheets credentials");
            return Err(e.into());
        }
    };
    let sheets = GoogleSheets::new(client.clone(), config.spreadsheet_id.clone(), token)?;

    let now: NaiveDateTime = args.now.unwrap_or_else(|| civil_now(config.utc_offset_hours));
    info!(%now, "Run instant");

    // ---- Run ----
    let result = match config.classifier {
        ClassifierMode::None => {
            let classifier = None::<&KeywordClassifier>;
            pipeline::run(&sheets, &sheets, classifier, &config, now, args.dry_run).await
        }
        ClassifierMode::Keywords => {
            let classifier = KeywordClassifier::new(&config.keywords);
            pipeline::run(&sheets, &sheets, Some(&classifier), &config, now, args.dry_run).await
        }
        ClassifierMode::Model => {
            if args.sentiment_token.is_none() {
                warn!("SENTIMENT_API_TOKEN not set; calling the model endpoint anonymously");
            }
            let model = HttpSentimentModel::new(
                client.clone(),
                config.sentiment_model.endpoint.clone(),
                args.sentiment_token.clone(),
            );
            let classifier = ModelClassifier::new(
                model,
                config.sentiment_model.max_chars,
                KeywordClassifier::new(&config.keywords),
            );
            pipeline::run(&sheets, &sheets, Some(&classifier), &config, now, args.dry_run).await
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            log_destination_failure(&e);
            return Err(e.into());
        }
    };
    log_report(&report);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

fn log_destination_failure(e: &DestinationWriteError) {
    error!(error = %e, "Publishing failed; today's sheet may be missing or incomplete");
}

fn log_report(report: &RunReport) {
    for count in &report.counts {
        info!(
            source = %count.source,
            kept = count.kept,
            skipped = count.skipped(),
            short_rows = count.short_rows,
            bad_dates = count.bad_dates,
            outside_window = count.outside_window,
            "Source summary"
        );
    }
    for source in &report.unavailable {
        warn!(%source, "Source was unavailable this run");
    }
    match &report.published {
        Some(published) => info!(
            sheet = %published.sheet.title,
            replaced = published.replaced,
            rows = published.rows_written,
            skipped = report.total_skipped(),
            window = %report.window,
            "Published daily sheet"
        ),
        None => info!(
            sheet = %report.sheet_name,
            would_write = report.total_kept(),
            skipped = report.total_skipped(),
            window = %report.window,
            "Dry run finished"
        ),
    }
}
