//! Output row layout.
//!
//! The destination sheet's columns are an ordered list of [`Column`]
//! producers. Each renders one cell from an [`Article`] and its position in
//! the batch, so every historical sheet layout is just a different list.
//!
//! Rows are written with `USER_ENTERED` so the duplicate-check formula
//! evaluates. Every cell carrying scraped or derived text is therefore
//! rendered through [`literal`], which makes Sheets store it verbatim: a
//! title such as `=IMPORTXML(..)` stays text and `3/11` stays a string.

use crate::dates::format_posted_at;
use crate::models::Article;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Source,
    Title,
    Url,
    PostedAt,
    Attribution,
    /// Left empty; reserved for comment counts filled in by hand.
    Blank,
    Sentiment,
    Category,
    /// Formula flagging URLs that appear more than once in the sheet.
    DuplicateCheck,
    Excerpt,
    /// 1-based position within the batch.
    Index,
}

impl Column {
    /// Source, title, URL, posted-at, attribution, blank, sentiment,
    /// category, duplicate check.
    pub fn default_schema() -> Vec<Column> {
        vec![
            Column::Source,
            Column::Title,
            Column::Url,
            Column::PostedAt,
            Column::Attribution,
            Column::Blank,
            Column::Sentiment,
            Column::Category,
            Column::DuplicateCheck,
        ]
    }

    pub fn header(&self) -> &'static str {
        match self {
            Column::Source => "Source",
            Column::Title => "Title",
            Column::Url => "URL",
            Column::PostedAt => "Posted At",
            Column::Attribution => "Attribution",
            Column::Blank => "Comments",
            Column::Sentiment => "Sentiment",
            Column::Category => "Category",
            Column::DuplicateCheck => "Duplicate",
            Column::Excerpt => "Excerpt",
            Column::Index => "No.",
        }
    }
}

/// Mark a cell as literal text for `USER_ENTERED` writes.
///
/// Sheets drops one leading apostrophe and stores the rest as a string.
fn literal(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("'{text}")
    }
}

/// Spreadsheet column letter for a 0-based index: 0 → `A`, 26 → `AA`.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<Column>,
}

impl OutputSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Source cells a row needs: title, URL and date always; attribution
    /// too when it is emitted.
    pub fn min_source_cells(&self) -> usize {
        if self.reads_attribution() { 4 } else { 3 }
    }

    pub fn reads_attribution(&self) -> bool {
        self.columns.contains(&Column::Attribution)
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header().to_string()).collect()
    }

    /// Render the batch. `first_row` is the sheet row of the first article,
    /// used by formulas that refer to their own row.
    pub fn render(&self, articles: &[Article], first_row: u32) -> Vec<Vec<String>> {
        let url_col = self
            .columns
            .iter()
            .position(|c| *c == Column::Url)
            .map(column_letter);

        articles
            .iter()
            .enumerate()
            .map(|(i, article)| {
                let row = first_row + i as u32;
                self.columns
                    .iter()
                    .map(|column| match column {
                        Column::Source => article.source.to_string(),
                        Column::Title => literal(&article.title),
                        Column::Url => literal(&article.url),
                        Column::PostedAt => literal(&format_posted_at(&article.posted_at)),
                        Column::Attribution => literal(&article.attribution),
                        Column::Blank => String::new(),
                        Column::Sentiment => article
                            .sentiment
                            .map(|s| s.to_string())
                            .unwrap_or_default(),
                        Column::Category => {
                            literal(article.category.as_deref().unwrap_or_default())
                        }
                        Column::DuplicateCheck => match &url_col {
                            Some(col) => format!(
                                "=IF(COUNTIF(${col}:${col},{col}{row})>1,\"DUP\",\"\")"
                            ),
                            None => String::new(),
                        },
                        Column::Excerpt => {
                            literal(article.excerpt.as_deref().unwrap_or_default())
                        }
                        Column::Index => (i + 1).to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}
