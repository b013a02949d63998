//! Run configuration.
//!
//! The job is meant to run with no arguments at all, so [`Config::default`]
//! carries the complete production setup: which spreadsheet, which source
//! sheets in which order, how the destination is created, the output columns
//! and the keyword tables. A YAML file can override any subset of fields:
//!
//! ```yaml
//! spreadsheet_id: 1IYUuwzvlR2OJC8r3FkaUvA44tc0XGqT2kxbAXiMgt2s
//! sources: [MSN, Google, Yahoo]
//! destination:
//!   mode: template
//!   template: Base
//! classifier: model
//! utc_offset_hours: 9
//! ```

use crate::errors::ConfigError;
use crate::models::Source;
use crate::outputs::schema::Column;
use serde::Deserialize;
use std::fs;
use tracing::{info, instrument};

/// Spreadsheet holding the source sheets, the template and the daily output.
pub const DEFAULT_SPREADSHEET_ID: &str = "1IYUuwzvlR2OJC8r3FkaUvA44tc0XGqT2kxbAXiMgt2s";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    /// Source sheets, in output order.
    pub sources: Vec<Source>,
    pub destination: DestinationMode,
    /// 1-based sheet row receiving the first article.
    pub first_data_row: u32,
    /// Output columns, left to right starting at column A.
    pub columns: Vec<Column>,
    pub classifier: ClassifierMode,
    pub keywords: KeywordTables,
    pub sentiment_model: SentimentModelConfig,
    /// Upper bound on every HTTP call, in seconds.
    pub request_timeout_secs: u64,
    /// Civil clock for "now". Host local time when unset.
    pub utc_offset_hours: Option<i32>,
}

/// How the daily sheet is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DestinationMode {
    /// Duplicate a formatted template sheet.
    Template { template: String },
    /// Add an empty sheet and write a header row derived from the columns.
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    None,
    Keywords,
    Model,
}

/// A category label and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryKeywords {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Static keyword tables for the keyword classifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    /// Checked in order; the first label with a matching keyword wins.
    pub categories: Vec<CategoryKeywords>,
    pub fallback_category: String,
    /// Checked before `positive`.
    pub negative: Vec<String>,
    pub positive: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SentimentModelConfig {
    /// Text-classification endpoint (`POST {"inputs": ...}`).
    pub endpoint: String,
    /// Characters of the title sent to the model.
    pub max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            sources: vec![Source::Msn, Source::Google, Source::Yahoo],
            destination: DestinationMode::Template {
                template: "Base".to_string(),
            },
            first_data_row: 2,
            columns: Column::default_schema(),
            classifier: ClassifierMode::Keywords,
            keywords: KeywordTables::default(),
            sentiment_model: SentimentModelConfig::default(),
            request_timeout_secs: 30,
            utc_offset_hours: None,
        }
    }
}

impl Default for SentimentModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/koheiw/bert-base-japanese-sentiment"
                .to_string(),
            max_chars: 256,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn category(label: &str, keywords: &[&str]) -> CategoryKeywords {
    CategoryKeywords {
        label: label.to_string(),
        keywords: words(keywords),
    }
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            categories: vec![
                category(
                    "Politics",
                    &[
                        "政治", "首相", "選挙", "国会", "政府", "大臣", "与党", "野党",
                        "election", "minister", "parliament",
                    ],
                ),
                category(
                    "Economy",
                    &[
                        "経済", "株価", "円安", "円高", "日銀", "金利", "物価", "決算", "賃上げ",
                        "economy", "stock", "inflation",
                    ],
                ),
                category(
                    "International",
                    &[
                        "米国", "アメリカ", "中国", "韓国", "ロシア", "ウクライナ", "外交", "海外",
                        "diplomacy", "overseas",
                    ],
                ),
                category(
                    "Technology",
                    &[
                        "人工知能", "生成ai", "半導体", "スマホ", "アプリ", "技術", "chatgpt",
                        "technology",
                    ],
                ),
                category(
                    "Sports",
                    &[
                        "野球", "サッカー", "五輪", "大谷", "試合", "優勝", "baseball", "soccer",
                        "olympic",
                    ],
                ),
                category(
                    "Entertainment",
                    &[
                        "芸能", "俳優", "女優", "歌手", "映画", "ドラマ", "アイドル", "movie",
                        "actor",
                    ],
                ),
            ],
            fallback_category: "Society".to_string(),
            negative: words(&[
                "死亡", "事故", "逮捕", "火災", "被害", "下落", "減少", "批判", "事件", "懸念",
                "悪化", "地震", "詐欺", "crash", "death", "killed", "arrest", "decline",
            ]),
            positive: words(&[
                "上昇", "増加", "成功", "優勝", "受賞", "好調", "回復", "過去最高", "記録更新",
                "開業", "growth", "record", "success", "wins",
            ]),
        }
    }
}

impl Config {
    /// Load configuration: defaults, overlaid with `path` when given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_string(),
                    source,
                })?;
                let config: Config =
                    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.to_string(),
                        source,
                    })?;
                info!(path, "Loaded configuration file");
                config
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a sensible run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no sources configured".into()));
        }
        if self.columns.is_empty() {
            return Err(ConfigError::Invalid("output schema has no columns".into()));
        }
        if self.first_data_row == 0 {
            return Err(ConfigError::Invalid("first_data_row is 1-based".into()));
        }
        if self.destination == DestinationMode::Blank && self.first_data_row < 2 {
            return Err(ConfigError::Invalid(
                "blank destinations need row 1 for the header; first_data_row must be >= 2".into(),
            ));
        }
        if self.classifier == ClassifierMode::Model && self.sentiment_model.max_chars == 0 {
            return Err(ConfigError::Invalid("sentiment_model.max_chars must be > 0".into()));
        }
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Invalid("spreadsheet_id is empty".into()));
        }
        if let Some(h) = self.utc_offset_hours.filter(|h| !(-23..=23).contains(h)) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours must be within -23..=23, got {h}"
            )));
        }
        Ok(())
    }
}
