//! Sentiment from an external text-classification model.
//!
//! The model is reached through the [`SentimentModel`] trait so the HTTP
//! client can be swapped for a fake in tests. [`ModelClassifier`] owns the
//! policy around the call:
//!
//! - only the first `max_chars` characters of the title are sent
//! - any failure becomes [`Sentiment::Unknown`] and is logged, never returned
//! - categories still come from the keyword category table

use super::{Classify, KeywordClassifier};
use crate::errors::ClassifierError;
use crate::models::{Classification, Sentiment};
use crate::utils::{truncate_chars, truncate_for_log};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// An external model that labels text with a sentiment.
pub trait SentimentModel {
    async fn label(&self, text: &str) -> Result<Sentiment, ClassifierError>;
}

/// Hosted inference endpoint speaking the `{"inputs": ...}` protocol.
#[derive(Debug, Clone)]
pub struct HttpSentimentModel {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Endpoints answer either `[{..}]` or, batched, `[[{..}]]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn best(self) -> Option<LabelScore> {
        let scores = match self {
            InferenceResponse::Nested(batches) => batches.into_iter().flatten().collect(),
            InferenceResponse::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Map a model label onto the three sentiment classes.
fn sentiment_from_label(label: &str) -> Option<Sentiment> {
    let l = label.to_lowercase();
    if l.starts_with("pos") || l.contains("ポジティブ") {
        Some(Sentiment::Positive)
    } else if l.starts_with("neg") || l.contains("ネガティブ") {
        Some(Sentiment::Negative)
    } else if l.starts_with("neu") || l.contains("ニュートラル") {
        Some(Sentiment::Neutral)
    } else {
        None
    }
}

impl HttpSentimentModel {
    /// `client` should carry the run's request timeout.
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }
}

impl SentimentModel for HttpSentimentModel {
    #[instrument(level = "debug", skip_all)]
    async fn label(&self, text: &str) -> Result<Sentiment, ClassifierError> {
        let t0 = Instant::now();
        let mut req = self.client.post(&self.endpoint).json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::Transport(e)
            }
        })?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            status = status.as_u16(),
            "Sentiment call returned"
        );

        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: InferenceResponse = serde_json::from_str(&body)
            .map_err(|_| ClassifierError::Unrecognised(truncate_for_log(&body, 300)))?;
        let best = parsed
            .best()
            .ok_or_else(|| ClassifierError::Unrecognised("empty label list".into()))?;
        sentiment_from_label(&best.label).ok_or(ClassifierError::Unrecognised(best.label))
    }
}

/// Model sentiment plus keyword categories.
#[derive(Debug)]
pub struct ModelClassifier<M> {
    model: M,
    max_chars: usize,
    categories: KeywordClassifier,
}

impl<M: SentimentModel> ModelClassifier<M> {
    pub fn new(model: M, max_chars: usize, categories: KeywordClassifier) -> Self {
        Self {
            model,
            max_chars,
            categories,
        }
    }
}

impl<M: SentimentModel> Classify for ModelClassifier<M> {
    async fn classify(&self, title: &str) -> Classification {
        let prefix = truncate_chars(title, self.max_chars);
        let sentiment = match self.model.label(prefix).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!(
                    error = %e,
                    title = %truncate_for_log(title, 80),
                    "Sentiment model failed; marking Unknown"
                );
                Sentiment::Unknown
            }
        };
        Classification {
            sentiment,
            category: Some(self.categories.category(title)),
        }
    }
}
