//! Bearer-token acquisition for the Sheets API.
//!
//! Two sources are supported, tried in this order:
//!
//! 1. A secret blob from the environment (`GOOGLE_SHEETS_CREDENTIALS`). It
//!    may be a service-account key file, which is exchanged for a token
//!    scoped to `spreadsheets`, or an already-minted access token: bare, or
//!    JSON carrying one in `access_token` or `token`.
//! 2. The cloud metadata server, which hands out the default service
//!    account's token when running on managed infrastructure.
//!
//! The token is obtained once at startup and reused for the whole run.

use crate::errors::ConfigError;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;
use tracing::{info, instrument};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Debug, Deserialize)]
struct TokenBlob {
    access_token: Option<String>,
    token: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// What the credential blob holds.
#[derive(Debug, PartialEq, Eq)]
pub enum Credential {
    AccessToken(String),
    /// Raw JSON of a service-account key file.
    ServiceAccountKey(String),
}

/// Classify the credential blob without contacting anything.
pub fn credential_from_blob(blob: &str) -> Result<Credential, ConfigError> {
    let blob = blob.trim();
    if blob.is_empty() {
        return Err(ConfigError::Credentials("credential blob is empty".into()));
    }
    if !blob.starts_with('{') {
        return Ok(Credential::AccessToken(blob.to_string()));
    }

    let parsed: TokenBlob = serde_json::from_str(blob)
        .map_err(|e| ConfigError::Credentials(format!("credential blob is not valid JSON: {e}")))?;
    if parsed.kind.as_deref() == Some("service_account") {
        return Ok(Credential::ServiceAccountKey(blob.to_string()));
    }
    match parsed.access_token.or(parsed.token) {
        Some(token) if !token.trim().is_empty() => {
            Ok(Credential::AccessToken(token.trim().to_string()))
        }
        _ => Err(ConfigError::Credentials(
            "credential JSON is neither a service-account key nor carries an access_token".into(),
        )),
    }
}

/// Sign a JWT with the key and trade it for a `spreadsheets` access token.
async fn exchange_service_account(key_json: &str) -> Result<String, ConfigError> {
    let account = CustomServiceAccount::from_json(key_json)
        .map_err(|e| ConfigError::Credentials(format!("unusable service-account key: {e}")))?;
    let token = account.token(&[SPREADSHEETS_SCOPE]).await.map_err(|e| {
        ConfigError::Credentials(format!("service-account token exchange failed: {e}"))
    })?;
    Ok(token.as_str().to_string())
}

/// Resolve the run's bearer token.
pub async fn resolve_token(
    client: &reqwest::Client,
    blob: Option<&str>,
) -> Result<String, ConfigError> {
    resolve_token_with(client, blob, METADATA_TOKEN_URL).await
}

#[instrument(level = "info", skip(client, blob))]
async fn resolve_token_with(
    client: &reqwest::Client,
    blob: Option<&str>,
    metadata_url: &str,
) -> Result<String, ConfigError> {
    if let Some(blob) = blob {
        return match credential_from_blob(blob)? {
            Credential::AccessToken(token) => {
                info!("Using access token from credential blob");
                Ok(token)
            }
            Credential::ServiceAccountKey(key) => {
                let token = exchange_service_account(&key).await?;
                info!("Exchanged service-account key for an access token");
                Ok(token)
            }
        };
    }

    info!("No credential blob; asking the metadata server");
    let resp = client
        .get(metadata_url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| ConfigError::Credentials(format!("metadata server unreachable: {e}")))?;
    if !resp.status().is_success() {
        return Err(ConfigError::Credentials(format!(
            "metadata server returned HTTP {}",
            resp.status().as_u16()
        )));
    }
    let blob: TokenBlob = resp
        .json()
        .await
        .map_err(|e| ConfigError::Credentials(format!("bad metadata token response: {e}")))?;
    blob.access_token
        .ok_or_else(|| ConfigError::Credentials("metadata response has no access_token".into()))
}
