//! Publishing the daily destination sheet.
//!
//! A run always replaces the sheet named after its date: any sheet with that
//! name is deleted, a fresh one is created, and the whole batch is written in
//! a single call. An empty batch still leaves an (empty) sheet behind so
//! downstream readers always find one for the day.

use super::schema::OutputSchema;
use crate::config::DestinationMode;
use crate::errors::DestinationWriteError;
use crate::models::Article;
use crate::sheets::{SheetHandle, SheetStore};
use tracing::{info, instrument};

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub sheet: SheetHandle,
    /// An earlier sheet with the same name was removed first.
    pub replaced: bool,
    pub rows_written: usize,
}

/// Replace sheet `name` with `articles`, laid out by `schema` from
/// `first_data_row` on.
#[instrument(level = "info", skip(store, schema, articles), fields(articles = articles.len()))]
pub async fn publish_sheet<S: SheetStore>(
    store: &S,
    name: &str,
    destination: &DestinationMode,
    schema: &OutputSchema,
    first_data_row: u32,
    articles: &[Article],
) -> Result<Published, DestinationWriteError> {
    let replaced = store.delete_if_exists(name).await?;
    if replaced {
        info!(%name, "Replacing earlier sheet for this date");
    }

    let sheet = match destination {
        DestinationMode::Template { template } => store.create_from_template(name, template).await?,
        DestinationMode::Blank => store.create_blank(name, &schema.header()).await?,
    };
    info!(sheet_id = sheet.id, title = %sheet.title, "Created destination sheet");

    let rows = schema.render(articles, first_data_row);
    if !rows.is_empty() {
        store.write_rows(&sheet, first_data_row, &rows).await?;
    }
    info!(rows = rows.len(), first_data_row, "Wrote article rows");

    Ok(Published {
        sheet,
        replaced,
        rows_written: rows.len(),
    })
}
