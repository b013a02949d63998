//! Turning source sheets into the day's article batch.
//!
//! Sources are read one at a time, in configured order, and rows keep their
//! sheet order, so the output order is fully determined by the
//! configuration. Per row:
//!
//! 1. too few cells → skipped
//! 2. date cell does not normalize → skipped, logged with the raw value
//! 3. outside the window → skipped
//! 4. otherwise classified (if a classifier is set) and kept
//!
//! Nothing in here fails the run. A source sheet that cannot be read is
//! logged and left out.

use crate::classify::Classify;
use crate::dates::DateNormalizer;
use crate::errors::RowShapeError;
use crate::models::{Article, RawRow, Source};
use crate::outputs::schema::OutputSchema;
use crate::sheets::SourceReader;
use crate::window::Window;
use itertools::Itertools;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

const COL_TITLE: usize = 0;
const COL_URL: usize = 1;
const COL_POSTED_AT: usize = 2;
const COL_ATTRIBUTION: usize = 3;
const COL_EXCERPT: usize = 4;

/// Kept and skipped row counts for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCount {
    pub source: Source,
    pub kept: usize,
    pub short_rows: usize,
    pub bad_dates: usize,
    pub outside_window: usize,
}

impl SourceCount {
    fn new(source: Source) -> Self {
        Self {
            source,
            kept: 0,
            short_rows: 0,
            bad_dates: 0,
            outside_window: 0,
        }
    }

    pub fn skipped(&self) -> usize {
        self.short_rows + self.bad_dates + self.outside_window
    }
}

impl fmt::Display for SourceCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} kept/{} skipped", self.source, self.kept, self.skipped())
    }
}

/// The batch plus what happened to each source.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub articles: Vec<Article>,
    /// One entry per source that was read, in processing order.
    pub counts: Vec<SourceCount>,
    /// Sources whose sheet could not be read.
    pub unavailable: Vec<Source>,
}

impl Extraction {
    /// One-line per-source summary for logs.
    pub fn summary(&self) -> String {
        self.counts.iter().join(", ")
    }
}

/// Inputs that stay fixed across all sources of a run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    pub window: Window,
    pub normalizer: DateNormalizer,
    pub schema: &'a OutputSchema,
}

fn check_shape(row: &RawRow, required: usize) -> Result<(), RowShapeError> {
    if row.len() < required {
        Err(RowShapeError {
            actual: row.len(),
            required,
        })
    } else {
        Ok(())
    }
}

/// Read every source and assemble the batch.
#[instrument(level = "info", skip_all, fields(window = %opts.window))]
pub async fn extract_articles<R, C>(
    reader: &R,
    sources: &[Source],
    opts: ExtractOptions<'_>,
    classifier: Option<&C>,
) -> Extraction
where
    R: SourceReader,
    C: Classify,
{
    let mut out = Extraction::default();

    for &source in sources {
        let rows = match reader.read_all_rows(source.as_str()).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(%source, error = %e, "Could not read source sheet; leaving it out");
                out.unavailable.push(source);
                continue;
            }
        };

        let mut count = SourceCount::new(source);
        // first row is the header
        for (i, row) in rows.iter().enumerate().skip(1) {
            let line = i + 1;
            if let Err(e) = check_shape(row, opts.schema.min_source_cells()) {
                debug!(%source, line, error = %e, "Skipping short row");
                count.short_rows += 1;
                continue;
            }

            let raw_date = &row[COL_POSTED_AT];
            let posted_at = match opts.normalizer.normalize(raw_date) {
                Ok(ts) => ts,
                Err(e) => {
                    warn!(
                        %source,
                        line,
                        raw = %e.raw(),
                        error = %e,
                        "Skipping row with unparseable date"
                    );
                    count.bad_dates += 1;
                    continue;
                }
            };

            if !opts.window.contains(&posted_at) {
                debug!(%source, line, %posted_at, "Skipping row outside window");
                count.outside_window += 1;
                continue;
            }

            let title = row[COL_TITLE].trim().to_string();
            let (sentiment, category) = match classifier {
                Some(c) => {
                    let label = c.classify(&title).await;
                    (Some(label.sentiment), label.category)
                }
                None => (None, None),
            };

            out.articles.push(Article {
                source,
                title,
                url: row[COL_URL].trim().to_string(),
                posted_at,
                attribution: if opts.schema.reads_attribution() {
                    row[COL_ATTRIBUTION].trim().to_string()
                } else {
                    String::new()
                },
                excerpt: row
                    .get(COL_EXCERPT)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                sentiment,
                category,
            });
            count.kept += 1;
        }

        info!(
            %source,
            kept = count.kept,
            skipped = count.skipped(),
            short_rows = count.short_rows,
            bad_dates = count.bad_dates,
            outside_window = count.outside_window,
            "Processed source"
        );
        out.counts.push(count);
    }

    out
}
