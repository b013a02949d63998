//! Output generation for the daily destination sheet.
//!
//! # Submodules
//!
//! - [`schema`]: column producers and row rendering
//! - [`sheet`]: delete / recreate / bulk-write of the dated sheet
//!
//! # Output Layout
//!
//! ```text
//! spreadsheet/
//! ├── Base        # template, copied each run
//! ├── MSN         # source sheets, read only
//! ├── Google
//! ├── Yahoo
//! └── 250612      # today's batch, replaced on re-run
//! ```

pub mod schema;
pub mod sheet;
