//! Keyword-table classification.
//!
//! Titles are lower-cased and scanned for keyword substrings. Tables are
//! ordered: the first category with a hit wins, and negative keywords are
//! checked before positive ones.

use super::Classify;
use crate::config::KeywordTables;
use crate::models::{Classification, Sentiment};

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Vec<(String, Vec<String>)>,
    fallback_category: String,
    negative: Vec<String>,
    positive: Vec<String>,
}

fn lowered(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

impl KeywordClassifier {
    pub fn new(tables: &KeywordTables) -> Self {
        Self {
            categories: tables
                .categories
                .iter()
                .map(|c| (c.label.clone(), lowered(&c.keywords)))
                .collect(),
            fallback_category: tables.fallback_category.clone(),
            negative: lowered(&tables.negative),
            positive: lowered(&tables.positive),
        }
    }

    /// First matching category label, or the fallback.
    pub fn category(&self, title: &str) -> String {
        let title = title.to_lowercase();
        self.categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k.as_str())))
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| self.fallback_category.clone())
    }

    /// Negative beats positive; neither is neutral.
    pub fn sentiment(&self, title: &str) -> Sentiment {
        let title = title.to_lowercase();
        let hit = |list: &[String]| list.iter().any(|k| title.contains(k.as_str()));
        if hit(&self.negative) {
            Sentiment::Negative
        } else if hit(&self.positive) {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    }
}

impl Classify for KeywordClassifier {
    async fn classify(&self, title: &str) -> Classification {
        Classification {
            sentiment: self.sentiment(title),
            category: Some(self.category(title)),
        }
    }
}
