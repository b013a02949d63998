//! Data models shared across the pipeline.
//!
//! - [`Source`]: the fixed set of news providers, one source sheet each
//! - [`RawRow`]: cells of one source-sheet row, exactly as read
//! - [`Article`]: a kept, normalized row ready to be rendered
//! - [`Sentiment`] / [`Classification`]: optional classifier output

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fmt;

/// One row of a source sheet. Length is not guaranteed.
pub type RawRow = Vec<String>;

/// A news provider. Each maps to a source sheet of the same name and tags
/// every output row it contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Source {
    #[serde(rename = "MSN")]
    Msn,
    Google,
    Yahoo,
}

impl Source {
    /// Sheet name, also written into the output's source column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Msn => "MSN",
            Source::Google => "Google",
            Source::Yahoo => "Yahoo",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label for a title.
///
/// `Unknown` means a classifier ran but could not decide (external model
/// failure); `None` on an [`Article`] means no classifier ran at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a classifier says about one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub category: Option<String>,
}

/// A source row that survived shape, date and window checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Provider this row was read from.
    pub source: Source,
    pub title: String,
    pub url: String,
    /// Normalized publication time (civil time, same clock as the window).
    pub posted_at: NaiveDateTime,
    /// Publisher credit; empty when the schema does not read it.
    pub attribution: String,
    /// Optional teaser text from the fifth source column.
    pub excerpt: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names_match_sheet_names() {
        assert_eq!(Source::Msn.as_str(), "MSN");
        assert_eq!(Source::Google.to_string(), "Google");
        assert_eq!(Source::Yahoo.to_string(), "Yahoo");
    }

    #[test]
    fn test_source_deserializes_from_sheet_name() {
        let sources: Vec<Source> = serde_yaml::from_str("[MSN, Google, Yahoo]").unwrap();
        assert_eq!(sources, vec![Source::Msn, Source::Google, Source::Yahoo]);
    }

    #[test]
    fn test_sentiment_display() {
        assert_eq!(Sentiment::Negative.to_string(), "Negative");
        assert_eq!(Sentiment::Unknown.as_str(), "Unknown");
    }
}
