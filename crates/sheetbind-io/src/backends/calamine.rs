#![cfg(feature = "calamine")]

use crate::traits::{CellData, SheetData, SpreadsheetReader};
use parking_lot::RwLock;
use sheetbind_common::CellValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};

/// Read-only xlsx backend. Faster than umya on large files but cannot write
/// templates and does not report styles, merges or widths.
pub struct CalamineAdapter {
    workbook: RwLock<Xlsx<BufReader<File>>>,
}

impl CalamineAdapter {
    fn convert_value(data: &Data) -> Option<CellValue> {
        match data {
            Data::Empty => None,
            Data::String(s) if s.is_empty() => None,
            Data::String(s) => Some(CellValue::Text(s.clone())),
            Data::Float(f) => Some(CellValue::Number(*f)),
            Data::Int(i) => Some(CellValue::Int(*i)),
            Data::Bool(b) => Some(CellValue::Boolean(*b)),
            Data::Error(e) => Some(CellValue::Error(e.to_string())),
            Data::DateTime(dt) => Some(CellValue::from_serial_number(dt.as_f64())),
            Data::DateTimeIso(s) => Some(
                chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                    .map(CellValue::DateTime)
                    .or_else(|_| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map(CellValue::Date))
                    .unwrap_or_else(|_| CellValue::Text(s.clone())),
            ),
            Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        }
    }

    fn range_to_sheet(range: &Range<Data>) -> SheetData {
        let mut data = SheetData::default();
        let (start_row, start_col) = range.start().unwrap_or_default();
        // used_cells() is relative to the range start, both 0-based
        for (row, col, val) in range.used_cells() {
            let Some(value) = Self::convert_value(val) else {
                continue;
            };
            let at = (start_row + row as u32 + 1, start_col + col as u32 + 1);
            data.cells.insert(at, CellData::from_value(value));
        }
        data.recompute_dimensions();
        data
    }
}

impl SpreadsheetReader for CalamineAdapter {
    type Error = calamine::Error;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.workbook.read().sheet_names().to_vec())
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let workbook: Xlsx<BufReader<File>> = open_workbook(path)?;
        Ok(Self {
            workbook: RwLock::new(workbook),
        })
    }

    fn open_bytes(_data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Err(unsupported("reading from bytes"))
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        let range = self.workbook.write().worksheet_range(sheet)?;
        Ok(Self::range_to_sheet(&range))
    }
}

fn unsupported(what: &str) -> calamine::Error {
    calamine::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("{what} is not supported by the calamine backend"),
    ))
}
