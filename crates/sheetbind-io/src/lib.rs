//! Spreadsheet I/O capability for sheetbind.
//!
//! The mapping layer never touches a file format directly. It talks to a
//! [`SpreadsheetReader`] when loading and a [`SpreadsheetWriter`] when
//! producing templates; the backends in [`backends`] implement both for
//! concrete formats.

pub mod backends;
pub mod error;
pub mod traits;

#[cfg(feature = "calamine")]
pub use backends::CalamineAdapter;
#[cfg(feature = "json")]
pub use backends::JsonAdapter;
#[cfg(feature = "umya")]
pub use backends::UmyaAdapter;
pub use error::IoError;
pub use traits::{
    CellData, CellStyle, DATE_NUMBER_FORMAT, SaveDestination, SheetData, SpreadsheetReader,
    SpreadsheetWriter,
};

// Re-export for convenience
pub use sheetbind_common::{CellRange, CellRef, CellValue};
