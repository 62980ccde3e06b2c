//! Fixture helpers shared by the integration tests of the sheetbind crates.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use umya_spreadsheet::Spreadsheet;

/// An xlsx file on disk that lives as long as this value.
pub struct WorkbookFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl WorkbookFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for WorkbookFixture {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Build an xlsx with umya, starting from its default `Sheet1`, and write it
/// to a temp directory.
pub fn build_workbook(f: impl FnOnce(&mut Spreadsheet)) -> WorkbookFixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.xlsx");
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write xlsx fixture");
    WorkbookFixture { _dir: dir, path }
}

/// Re-open an xlsx so tests can inspect what a writer produced.
pub fn open_workbook(path: impl AsRef<Path>) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path.as_ref()).expect("read xlsx")
}

/// Edit an existing xlsx in place.
pub fn edit_workbook(path: impl AsRef<Path>, f: impl FnOnce(&mut Spreadsheet)) {
    let mut book = open_workbook(path.as_ref());
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path.as_ref()).expect("write xlsx");
}

/// Set a string value at 1-based `(row, col)`.
pub fn set_text(book: &mut Spreadsheet, sheet: &str, row: u32, col: u32, value: &str) {
    sheet_mut(book, sheet)
        .get_cell_mut((col, row))
        .set_value(value);
}

/// Set a numeric value at 1-based `(row, col)`.
pub fn set_number(book: &mut Spreadsheet, sheet: &str, row: u32, col: u32, value: f64) {
    sheet_mut(book, sheet)
        .get_cell_mut((col, row))
        .set_value_number(value);
}

/// Set a boolean value at 1-based `(row, col)`.
pub fn set_bool(book: &mut Spreadsheet, sheet: &str, row: u32, col: u32, value: bool) {
    sheet_mut(book, sheet)
        .get_cell_mut((col, row))
        .set_value_bool(value);
}

/// Read a cell's display value at 1-based `(row, col)`; missing cells read as "".
pub fn cell_text(book: &Spreadsheet, sheet: &str, row: u32, col: u32) -> String {
    book.get_sheet_by_name(sheet)
        .unwrap_or_else(|| panic!("sheet `{sheet}` missing"))
        .get_value((col, row))
}

fn sheet_mut<'a>(book: &'a mut Spreadsheet, sheet: &str) -> &'a mut umya_spreadsheet::Worksheet {
    if book.get_sheet_by_name(sheet).is_none() {
        book.new_sheet(sheet).expect("create sheet");
    }
    book.get_sheet_by_name_mut(sheet)
        .unwrap_or_else(|| panic!("sheet `{sheet}` missing"))
}
