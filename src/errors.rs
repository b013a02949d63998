//! Error types for every stage of a run.
//!
//! Row-level and source-level errors are always recovered from: the row or
//! source is skipped and the run continues. Only [`DestinationWriteError`] and
//! [`ConfigError`] are allowed to end a run.

use thiserror::Error;

/// A date cell that could not be turned into a timestamp.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateParseError {
    /// No supported layout matched the token.
    #[error("unrecognised date format: {raw:?}")]
    UnknownFormat { raw: String },
    /// A layout matched but the numbers are not a real calendar date or time.
    #[error("not a valid calendar date/time: {raw:?}")]
    OutOfRange { raw: String },
}

impl DateParseError {
    /// The offending cell value, untrimmed.
    pub fn raw(&self) -> &str {
        match self {
            DateParseError::UnknownFormat { raw } | DateParseError::OutOfRange { raw } => raw,
        }
    }
}

/// A source row with fewer cells than the output schema reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("row has {actual} cells, needs at least {required}")]
pub struct RowShapeError {
    pub actual: usize,
    pub required: usize,
}

/// A whole source table could not be read.
#[derive(Debug, Error)]
pub enum SourceReadError {
    #[error("request for source sheet {sheet:?} failed: {source}")]
    Transport {
        sheet: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("source sheet {sheet:?} returned HTTP {status}: {body}")]
    Status {
        sheet: String,
        status: u16,
        body: String,
    },
    #[error("source sheet {sheet:?} does not exist")]
    Missing { sheet: String },
}

/// The external sentiment model failed; callers map this to `Unknown`.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("sentiment request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sentiment endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("sentiment request timed out")]
    Timeout,
    #[error("sentiment response had no usable label: {0}")]
    Unrecognised(String),
}

/// Anything that goes wrong on the destination side. Fatal for the run.
#[derive(Debug, Error)]
pub enum DestinationWriteError {
    #[error("destination request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("destination returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("template sheet {0:?} not found")]
    TemplateMissing(String),
    #[error("unexpected response from destination: {0}")]
    Malformed(String),
}

/// Startup problems: configuration and credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("could not obtain credentials: {0}")]
    Credentials(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parse_error_keeps_raw_value() {
        let e = DateParseError::UnknownFormat {
            raw: "not-a-date".to_string(),
        };
        assert_eq!(e.raw(), "not-a-date");
        assert!(e.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_row_shape_error_message() {
        let e = RowShapeError {
            actual: 2,
            required: 4,
        };
        assert_eq!(e.to_string(), "row has 2 cells, needs at least 4");
    }
}
