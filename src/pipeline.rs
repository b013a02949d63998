//! One run of the job: window → extraction → publish.
//!
//! All collaborators are passed in, so the same wiring runs against Google
//! Sheets in production and against an in-memory workbook in tests.

use crate::classify::Classify;
use crate::config::Config;
use crate::dates::DateNormalizer;
use crate::errors::DestinationWriteError;
use crate::extract::{ExtractOptions, SourceCount, extract_articles};
use crate::models::Source;
use crate::outputs::schema::OutputSchema;
use crate::outputs::sheet::{Published, publish_sheet};
use crate::sheets::{SheetStore, SourceReader};
use crate::utils::sheet_name_for;
use crate::window::Window;
use chrono::{Datelike, NaiveDateTime};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub sheet_name: String,
    pub window: Window,
    pub counts: Vec<SourceCount>,
    pub unavailable: Vec<Source>,
    /// `None` for dry runs.
    pub published: Option<Published>,
}

impl RunReport {
    pub fn total_kept(&self) -> usize {
        self.counts.iter().map(|c| c.kept).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.counts.iter().map(|c| c.skipped()).sum()
    }
}

/// Execute one run as of `now`. Only destination failures are returned.
#[instrument(level = "info", skip_all, fields(%now, dry_run))]
pub async fn run<R, S, C>(
    reader: &R,
    store: &S,
    classifier: Option<&C>,
    config: &Config,
    now: NaiveDateTime,
    dry_run: bool,
) -> Result<RunReport, DestinationWriteError>
where
    R: SourceReader,
    S: SheetStore,
    C: Classify,
{
    let window = Window::ending_on(now);
    let sheet_name = sheet_name_for(&now);
    let schema = OutputSchema::new(config.columns.clone());
    info!(%window, %sheet_name, sources = config.sources.len(), "Run starting");

    let opts = ExtractOptions {
        window,
        normalizer: DateNormalizer::new(now.year()),
        schema: &schema,
    };
    let extraction = extract_articles(reader, &config.sources, opts, classifier).await;
    info!(
        kept = extraction.articles.len(),
        summary = %extraction.summary(),
        "Extraction complete"
    );
    if !extraction.unavailable.is_empty() {
        warn!(unavailable = ?extraction.unavailable, "Some sources were left out");
    }

    let published = if dry_run {
        info!("Dry run; destination left untouched");
        None
    } else {
        Some(
            publish_sheet(
                store,
                &sheet_name,
                &config.destination,
                &schema,
                config.first_data_row,
                &extraction.articles,
            )
            .await?,
        )
    };

    Ok(RunReport {
        sheet_name,
        window,
        counts: extraction.counts,
        unavailable: extraction.unavailable,
        published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::KeywordClassifier;
    use crate::config::{ClassifierMode, DestinationMode};
    use crate::sheets::memory::MemoryWorkbook;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 12)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn row<'a>(title: &'a str, date: &'a str) -> Vec<&'a str> {
        vec![title, "https://example.com/x", date, "Kyodo"]
    }

    const IN: &str = "2025/06/12 08:00";
    const OUT: &str = "2025/06/10 08:00";

    /// MSN 5 rows (2 in), Google 3 rows (1 in), Yahoo 7 rows (4 in).
    fn workbook() -> MemoryWorkbook {
        let header = vec!["title", "url", "date", "by"];
        MemoryWorkbook::new()
            .with_sheet("Base", vec![vec!["Source", "Title"]])
            .with_sheet(
                "MSN",
                vec![
                    header.clone(),
                    row("m1", IN),
                    row("mx", OUT),
                    row("m2", "6/11 15:00"),
                    row("mx", "garbage"),
                    vec!["mx", "short"],
                ],
            )
            .with_sheet(
                "Google",
                vec![
                    header.clone(),
                    row("gx", OUT),
                    row("g1", "2025/6/12"),
                    row("gx", "2025/06/12 15:00"),
                ],
            )
            .with_sheet(
                "Yahoo",
                vec![
                    header,
                    row("y1", IN),
                    row("y2", IN),
                    row("yx", ""),
                    row("y3", "06/12/2025"),
                    row("yx", "2025/06/11 14:59"),
                    row("y4", "6/12"),
                    vec![],
                ],
            )
    }

    fn config() -> Config {
        Config {
            classifier: ClassifierMode::None,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_counts_and_order() {
        let wb = workbook();
        let report = run(&wb, &wb, None::<&KeywordClassifier>, &config(), now(), false)
            .await
            .unwrap();

        let counts: Vec<_> = report
            .counts
            .iter()
            .map(|c| (c.source, c.kept, c.skipped()))
            .collect();
        assert_eq!(
            counts,
            vec![(Source::Msn, 2, 3), (Source::Google, 1, 2), (Source::Yahoo, 4, 3)]
        );
        assert_eq!(report.total_kept(), 7);
        assert_eq!(report.total_skipped(), 8);

        let rows = wb.rows_of("250612").unwrap();
        let titles: Vec<_> = rows[1..].iter().map(|r| r[1].as_str()).collect();
        assert_eq!(titles, vec!["m1", "m2", "g1", "y1", "y2", "y3", "y4"]);
        let sources: Vec<_> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(sources, vec!["MSN", "MSN", "Google", "Yahoo", "Yahoo", "Yahoo", "Yahoo"]);
        assert_eq!(report.published.unwrap().rows_written, 7);
    }

    #[tokio::test]
    async fn test_same_day_rerun_leaves_one_sheet_with_latest_content() {
        let wb = workbook();
        run(&wb, &wb, None::<&KeywordClassifier>, &config(), now(), false)
            .await
            .unwrap();

        let mut narrower = config();
        narrower.sources = vec![Source::Google];
        let later = now() + chrono::Duration::hours(8);
        let report = run(&wb, &wb, None::<&KeywordClassifier>, &narrower, later, false)
            .await
            .unwrap();

        assert!(report.published.unwrap().replaced);
        assert_eq!(wb.titles().iter().filter(|t| *t == "250612").count(), 1);
        let rows = wb.rows_of("250612").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "g1");
    }

    #[tokio::test]
    async fn test_dry_run_does_not_touch_destination() {
        let wb = workbook();
        let report = run(&wb, &wb, None::<&KeywordClassifier>, &config(), now(), true)
            .await
            .unwrap();
        assert!(report.published.is_none());
        assert_eq!(report.total_kept(), 7);
        assert!(wb.rows_of("250612").is_none());
    }

    #[tokio::test]
    async fn test_destination_failure_aborts_run() {
        let wb = workbook().failing_writes();
        let result = run(&wb, &wb, None::<&KeywordClassifier>, &config(), now(), false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_blank_destination_with_classifier() {
        let wb = workbook();
        let config = Config {
            destination: DestinationMode::Blank,
            ..Config::default()
        };
        let classifier = KeywordClassifier::new(&config.keywords);
        run(&wb, &wb, Some(&classifier), &config, now(), false)
            .await
            .unwrap();

        let rows = wb.rows_of("250612").unwrap();
        assert_eq!(rows[0][0], "Source");
        assert_eq!(rows[0][6], "Sentiment");
        assert_eq!(rows[1][6], "Neutral");
        assert_eq!(rows[1][7], "Society");
        assert_eq!(rows.len(), 8);
    }
}
