//! Spreadsheet collaborators.
//!
//! The pipeline only needs two capabilities from the spreadsheet, expressed as
//! traits so the Google client and the in-memory test workbook are
//! interchangeable:
//!
//! - [`SourceReader`]: read every row of a source sheet
//! - [`SheetStore`]: replace the daily destination sheet and bulk-write rows
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | Google Sheets v4 REST | [`google`] | bearer token from [`auth`] |
//! | In-memory workbook | `memory` | tests only |

pub mod auth;
pub mod google;
#[cfg(test)]
pub mod memory;

use crate::errors::{DestinationWriteError, SourceReadError};
use crate::models::RawRow;

pub use google::GoogleSheets;

/// A sheet inside the spreadsheet, as returned by create operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub id: i64,
    pub title: String,
}

pub trait SourceReader {
    /// All rows of `sheet`, header included, in sheet order.
    async fn read_all_rows(&self, sheet: &str) -> Result<Vec<RawRow>, SourceReadError>;
}

pub trait SheetStore {
    /// Delete `name` if present. `Ok(false)` when there was nothing to delete.
    async fn delete_if_exists(&self, name: &str) -> Result<bool, DestinationWriteError>;

    /// Create `name` as a copy of `template`.
    async fn create_from_template(
        &self,
        name: &str,
        template: &str,
    ) -> Result<SheetHandle, DestinationWriteError>;

    /// Create an empty `name` whose first row is `header`.
    async fn create_blank(
        &self,
        name: &str,
        header: &[String],
    ) -> Result<SheetHandle, DestinationWriteError>;

    /// Write `rows` in one operation, the first one at 1-based `start_row`,
    /// starting at column A.
    async fn write_rows(
        &self,
        sheet: &SheetHandle,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<(), DestinationWriteError>;
}

/// Quote a sheet title for use in A1 notation.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 reference to column A of `row` in `title`, e.g. `'250612'!A2`.
pub fn a1_row(title: &str, row: u32) -> String {
    format!("{}!A{}", quote_sheet(title), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_sheet_escapes_apostrophes() {
        assert_eq!(quote_sheet("MSN"), "'MSN'");
        assert_eq!(quote_sheet("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_a1_row() {
        assert_eq!(a1_row("250612", 2), "'250612'!A2");
    }
}
