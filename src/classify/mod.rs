//! Title classification.
//!
//! Two interchangeable strategies implement [`Classify`]:
//!
//! | Strategy | Module | Sentiment | Category |
//! |----------|--------|-----------|----------|
//! | Keyword tables | [`keywords`] | negative/positive keyword lists | ordered category table |
//! | External model | [`model`] | HTTP text-classification call | category table |
//!
//! Classification never fails: the model strategy degrades to
//! [`Sentiment::Unknown`](crate::models::Sentiment::Unknown) when the external
//! call does.

pub mod keywords;
pub mod model;

use crate::models::Classification;

pub use keywords::KeywordClassifier;
pub use model::{HttpSentimentModel, ModelClassifier};

/// Labels one title with a sentiment and, when known, a category.
pub trait Classify {
    async fn classify(&self, title: &str) -> Classification;
}
