//! Google Sheets v4 REST client.
//!
//! A thin `reqwest` wrapper covering exactly the calls the job makes:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | read a source sheet | `GET  values/'<sheet>'` |
//! | list sheets | `GET  ?fields=sheets.properties(sheetId,title)` |
//! | delete / duplicate / add sheet | `POST :batchUpdate` |
//! | bulk write | `PUT  values/'<sheet>'!A<row>?valueInputOption=USER_ENTERED` |
//!
//! Every request goes through the shared client, so the configured timeout
//! bounds each call. Cells arrive already escaped by the output schema, so
//! only formulas are evaluated under `USER_ENTERED`.

use super::{SheetHandle, SheetStore, SourceReader, a1_row, quote_sheet};
use crate::errors::{ConfigError, DestinationWriteError, SourceReadError};
use crate::models::RawRow;
use crate::utils::truncate_for_log;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Clone)]
pub struct GoogleSheets {
    client: reqwest::Client,
    base: Url,
    spreadsheet_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

impl From<SheetProperties> for SheetHandle {
    fn from(p: SheetProperties) -> Self {
        SheetHandle {
            id: p.sheet_id,
            title: p.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Value>,
}

/// Render a cell the way it reads in the sheet.
fn cell_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl GoogleSheets {
    pub fn new(
        client: reqwest::Client,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::with_base(client, SHEETS_API, spreadsheet_id, token)
    }

    /// Client against another API root, e.g. an emulator.
    pub fn with_base(
        client: reqwest::Client,
        base: &str,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let base = Url::parse(base).map_err(|e| ConfigError::Invalid(format!("{base}: {e}")))?;
        Ok(Self {
            client,
            base,
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn batch_update_url(&self) -> Url {
        self.endpoint(&[&format!("{}:batchUpdate", self.spreadsheet_id)])
    }

    async fn sheet_by_title(
        &self,
        title: &str,
    ) -> Result<Option<SheetHandle>, DestinationWriteError> {
        let mut url = self.endpoint(&[&self.spreadsheet_id]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let resp = self.client.get(url).bearer_auth(&self.token).send().await?;
        let meta: SpreadsheetMeta = serde_json::from_str(&checked_body(resp).await?)
            .map_err(|e| DestinationWriteError::Malformed(e.to_string()))?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .map(SheetHandle::from))
    }

    async fn batch_update(
        &self,
        request: Value,
    ) -> Result<BatchUpdateResponse, DestinationWriteError> {
        let resp = self
            .client
            .post(self.batch_update_url())
            .bearer_auth(&self.token)
            .json(&json!({ "requests": [request] }))
            .send()
            .await?;
        serde_json::from_str(&checked_body(resp).await?)
            .map_err(|e| DestinationWriteError::Malformed(e.to_string()))
    }

    async fn put_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), DestinationWriteError> {
        let mut url = self.endpoint(&[&self.spreadsheet_id, "values", range]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": rows }))
            .send()
            .await?;
        checked_body(resp).await?;
        Ok(())
    }
}

/// Body of a successful response, or a status error with a body preview.
async fn checked_body(resp: reqwest::Response) -> Result<String, DestinationWriteError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(DestinationWriteError::Status {
            status: status.as_u16(),
            body: truncate_for_log(&body, 300),
        })
    }
}

/// Pull the new sheet's properties out of a `duplicateSheet`/`addSheet` reply.
fn created_sheet(
    reply: BatchUpdateResponse,
    kind: &str,
) -> Result<SheetHandle, DestinationWriteError> {
    let props = reply
        .replies
        .into_iter()
        .next()
        .and_then(|mut r| r.get_mut(kind).map(Value::take))
        .and_then(|mut r| r.get_mut("properties").map(Value::take))
        .ok_or_else(|| {
            DestinationWriteError::Malformed(format!("{kind} reply has no properties"))
        })?;
    serde_json::from_value::<SheetProperties>(props)
        .map(SheetHandle::from)
        .map_err(|e| DestinationWriteError::Malformed(e.to_string()))
}

impl SourceReader for GoogleSheets {
    #[instrument(level = "info", skip(self))]
    async fn read_all_rows(&self, sheet: &str) -> Result<Vec<RawRow>, SourceReadError> {
        let t0 = Instant::now();
        let url = self.endpoint(&[&self.spreadsheet_id, "values", &quote_sheet(sheet)]);
        let transport = |source| SourceReadError::Transport {
            sheet: sheet.to_string(),
            source,
        };

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            if status.as_u16() == 400 && body.contains("Unable to parse range") {
                return Err(SourceReadError::Missing {
                    sheet: sheet.to_string(),
                });
            }
            return Err(SourceReadError::Status {
                sheet: sheet.to_string(),
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let range: ValueRange = serde_json::from_str(&body).map_err(|e| SourceReadError::Status {
            sheet: sheet.to_string(),
            status: status.as_u16(),
            body: format!("unparseable values response: {e}"),
        })?;
        let rows: Vec<RawRow> = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        debug!(
            rows = rows.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Read source sheet"
        );
        Ok(rows)
    }
}

impl SheetStore for GoogleSheets {
    #[instrument(level = "info", skip(self))]
    async fn delete_if_exists(&self, name: &str) -> Result<bool, DestinationWriteError> {
        let Some(existing) = self.sheet_by_title(name).await? else {
            return Ok(false);
        };
        self.batch_update(json!({ "deleteSheet": { "sheetId": existing.id } }))
            .await?;
        info!(sheet_id = existing.id, "Deleted existing destination sheet");
        Ok(true)
    }

    #[instrument(level = "info", skip(self))]
    async fn create_from_template(
        &self,
        name: &str,
        template: &str,
    ) -> Result<SheetHandle, DestinationWriteError> {
        let source = self
            .sheet_by_title(template)
            .await?
            .ok_or_else(|| DestinationWriteError::TemplateMissing(template.to_string()))?;
        let reply = self
            .batch_update(json!({
                "duplicateSheet": { "sourceSheetId": source.id, "newSheetName": name }
            }))
            .await?;
        created_sheet(reply, "duplicateSheet")
    }

    #[instrument(level = "info", skip(self, header))]
    async fn create_blank(
        &self,
        name: &str,
        header: &[String],
    ) -> Result<SheetHandle, DestinationWriteError> {
        let reply = self
            .batch_update(json!({ "addSheet": { "properties": { "title": name } } }))
            .await?;
        let handle = created_sheet(reply, "addSheet")?;
        self.put_values(&a1_row(&handle.title, 1), &[header.to_vec()])
            .await?;
        Ok(handle)
    }

    #[instrument(
        level = "info",
        skip(self, sheet, rows),
        fields(sheet = %sheet.title, rows = rows.len())
    )]
    async fn write_rows(
        &self,
        sheet: &SheetHandle,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<(), DestinationWriteError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.put_values(&a1_row(&sheet.title, start_row), rows).await
    }
}
