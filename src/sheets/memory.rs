//! In-memory workbook implementing both collaborator traits, for tests.
//!
//! Writes store what Sheets would keep under `USER_ENTERED`: a leading
//! apostrophe marks literal text and is dropped.

use super::{SheetHandle, SheetStore, SourceReader};
use crate::errors::{DestinationWriteError, SourceReadError};
use crate::models::RawRow;
use std::collections::HashSet;
use std::sync::Mutex;

fn stored_text(cell: &str) -> String {
    cell.strip_prefix('\'').unwrap_or(cell).to_string()
}

#[derive(Debug, Clone)]
struct MemorySheet {
    id: i64,
    title: String,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<MemorySheet>,
    next_id: i64,
    bulk_writes: usize,
}

#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    state: Mutex<State>,
    unreadable: HashSet<String>,
    fail_writes: bool,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet with the given rows (row 1 first).
    pub fn with_sheet(self, title: &str, rows: Vec<Vec<&str>>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id;
            state.next_id += 1;
            state.sheets.push(MemorySheet {
                id,
                title: title.to_string(),
                rows: rows
                    .into_iter()
                    .map(|r| r.into_iter().map(str::to_string).collect())
                    .collect(),
            });
        }
        self
    }

    /// Make reads of `title` fail as if the sheet were unreachable.
    pub fn unreadable(mut self, title: &str) -> Self {
        self.unreadable.insert(title.to_string());
        self
    }

    /// Make every destination write fail.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn titles(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.sheets.iter().map(|s| s.title.clone()).collect()
    }

    pub fn rows_of(&self, title: &str) -> Option<Vec<Vec<String>>> {
        let state = self.state.lock().unwrap();
        state
            .sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.rows.clone())
    }

    pub fn bulk_writes(&self) -> usize {
        self.state.lock().unwrap().bulk_writes
    }

    fn add(
        &self,
        title: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<SheetHandle, DestinationWriteError> {
        if self.fail_writes {
            return Err(DestinationWriteError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        if state.sheets.iter().any(|s| s.title == title) {
            return Err(DestinationWriteError::Status {
                status: 400,
                body: format!("A sheet with the name \"{title}\" already exists."),
            });
        }
        let id = state.next_id;
        state.next_id += 1;
        state.sheets.push(MemorySheet {
            id,
            title: title.to_string(),
            rows,
        });
        Ok(SheetHandle {
            id,
            title: title.to_string(),
        })
    }
}

impl SourceReader for MemoryWorkbook {
    async fn read_all_rows(&self, sheet: &str) -> Result<Vec<RawRow>, SourceReadError> {
        if self.unreadable.contains(sheet) {
            return Err(SourceReadError::Status {
                sheet: sheet.to_string(),
                status: 500,
                body: "backend error".into(),
            });
        }
        self.rows_of(sheet).ok_or_else(|| SourceReadError::Missing {
            sheet: sheet.to_string(),
        })
    }
}

impl SheetStore for MemoryWorkbook {
    async fn delete_if_exists(&self, name: &str) -> Result<bool, DestinationWriteError> {
        let mut state = self.state.lock().unwrap();
        let before = state.sheets.len();
        state.sheets.retain(|s| s.title != name);
        Ok(state.sheets.len() != before)
    }

    async fn create_from_template(
        &self,
        name: &str,
        template: &str,
    ) -> Result<SheetHandle, DestinationWriteError> {
        let rows = self
            .rows_of(template)
            .ok_or_else(|| DestinationWriteError::TemplateMissing(template.to_string()))?;
        self.add(name, rows)
    }

    async fn create_blank(
        &self,
        name: &str,
        header: &[String],
    ) -> Result<SheetHandle, DestinationWriteError> {
        self.add(name, vec![header.to_vec()])
    }

    async fn write_rows(
        &self,
        sheet: &SheetHandle,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<(), DestinationWriteError> {
        if self.fail_writes {
            return Err(DestinationWriteError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        state.bulk_writes += 1;
        let target = state
            .sheets
            .iter_mut()
            .find(|s| s.id == sheet.id)
            .ok_or_else(|| DestinationWriteError::Malformed(format!("no sheet {}", sheet.id)))?;
        let first = start_row.saturating_sub(1) as usize;
        for (i, row) in rows.iter().enumerate() {
            let idx = first + i;
            if target.rows.len() <= idx {
                target.rows.resize(idx + 1, Vec::new());
            }
            target.rows[idx] = row.iter().map(|cell| stored_text(cell)).collect();
        }
        Ok(())
    }
}
