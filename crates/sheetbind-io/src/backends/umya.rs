#![cfg(feature = "umya")]

use crate::traits::{
    CellData, CellStyle, SaveDestination, SheetData, SpreadsheetReader, SpreadsheetWriter,
};
use parking_lot::RwLock;
use sheetbind_common::{CellRange, CellValue};
use std::io::Cursor;
use std::path::Path;
use umya_spreadsheet::{
    CellRawValue, HorizontalAlignmentValues, Spreadsheet, Worksheet, XlsxError, reader::xlsx,
};

pub struct UmyaAdapter {
    workbook: RwLock<Spreadsheet>,
    original_path: Option<std::path::PathBuf>,
}

impl Default for UmyaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UmyaAdapter {
    /// Fresh in-memory workbook holding umya's default `Sheet1`.
    pub fn new() -> Self {
        Self {
            workbook: RwLock::new(umya_spreadsheet::new_file()),
            original_path: None,
        }
    }

    fn sheet_error(sheet: &str) -> XlsxError {
        XlsxError::CellError(format!("sheet `{sheet}` not found"))
    }

    fn convert_cell_value(cell: &umya_spreadsheet::Cell) -> Option<CellValue> {
        let cv = cell.get_cell_value();
        let raw = cv.get_raw_value();
        if raw.is_empty() {
            return None;
        }
        if raw.is_error() {
            return Some(CellValue::Error(cv.get_value().to_string()));
        }
        match raw {
            CellRawValue::Numeric(n) => {
                if Self::has_date_format(cell) {
                    Some(CellValue::from_serial_number(*n))
                } else {
                    Some(CellValue::Number(*n))
                }
            }
            CellRawValue::Bool(b) => Some(CellValue::Boolean(*b)),
            CellRawValue::String(s) => Some(CellValue::Text(s.to_string())),
            CellRawValue::RichText(rt) => Some(CellValue::Text(rt.get_text().to_string())),
            CellRawValue::Lazy(s) => {
                // attempt parse
                let txt = s.as_ref();
                if let Ok(n) = txt.parse::<f64>() {
                    Some(CellValue::Number(n))
                } else if txt.eq_ignore_ascii_case("TRUE") {
                    Some(CellValue::Boolean(true))
                } else if txt.eq_ignore_ascii_case("FALSE") {
                    Some(CellValue::Boolean(false))
                } else {
                    Some(CellValue::Text(txt.to_string()))
                }
            }
            CellRawValue::Error(_) | CellRawValue::Empty => None,
        }
    }

    fn has_date_format(cell: &umya_spreadsheet::Cell) -> bool {
        cell.get_style()
            .get_number_format()
            .map(|nf| is_date_format_code(nf.get_format_code()))
            .unwrap_or(false)
    }

    fn convert_style(cell: &umya_spreadsheet::Cell) -> Option<CellStyle> {
        let style = cell.get_style();
        let bold = style.get_font().map(|f| *f.get_bold()).unwrap_or(false);
        let centered = style
            .get_alignment()
            .map(|a| a.get_horizontal() == &HorizontalAlignmentValues::Center)
            .unwrap_or(false);
        let number_format = style
            .get_number_format()
            .map(|nf| nf.get_format_code().to_string())
            .filter(|code| is_date_format_code(code));
        if !bold && !centered && number_format.is_none() {
            return None;
        }
        Some(CellStyle {
            bold,
            centered,
            number_format,
        })
    }

    fn apply_style(ws: &mut Worksheet, row: u32, col: u32, style: &CellStyle) {
        let target = ws.get_style_mut((col, row));
        if style.bold {
            target.get_font_mut().set_bold(true);
        }
        if style.centered {
            target
                .get_alignment_mut()
                .set_horizontal(HorizontalAlignmentValues::Center);
        }
        if let Some(code) = &style.number_format {
            target.get_number_format_mut().set_format_code(code.as_str());
        }
    }

    fn sheet_mut<'a>(wb: &'a mut Spreadsheet, sheet: &str) -> Result<&'a mut Worksheet, XlsxError> {
        // If sheet missing create before any deserialize attempts
        if wb.get_sheet_by_name(sheet).is_none() {
            wb.new_sheet(sheet).map_err(|e| XlsxError::CellError(e.to_string()))?;
        }
        wb.get_sheet_by_name_mut(sheet)
            .ok_or_else(|| Self::sheet_error(sheet))
    }
}

/// Rough check for a date-like number format (`yyyy-mm-dd`, `d-mmm-yy`, ...).
fn is_date_format_code(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    if lower == "general" {
        return false;
    }
    // Ignore quoted literals and bracketed sections like [Red] or [$-409]
    let mut stripped = String::with_capacity(lower.len());
    let mut in_quote = false;
    let mut in_bracket = false;
    for ch in lower.chars() {
        match ch {
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if in_quote || in_bracket => {}
            _ => stripped.push(ch),
        }
    }
    stripped.contains('y') || (stripped.contains('d') && stripped.contains('m'))
}

impl SpreadsheetReader for UmyaAdapter {
    type Error = XlsxError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        // Need write lock to deserialize sheets lazily
        let mut wb = self.workbook.write();
        let count = wb.get_sheet_count();
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            wb.read_sheet(i); // ensure sheet deserialized
            if let Some(s) = wb.get_sheet(&i) {
                names.push(s.get_name().to_string());
            }
        }
        Ok(names)
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        // Use full read (not lazy) so that save operations don't hit deserialization assertions
        let book = xlsx::read(path.as_ref())?;
        Ok(Self {
            workbook: RwLock::new(book),
            original_path: Some(path.as_ref().to_path_buf()),
        })
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let book = xlsx::read_reader(Cursor::new(data), true)?;
        Ok(Self {
            workbook: RwLock::new(book),
            original_path: None,
        })
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        // Workbooks are always opened with sheets deserialized, so a plain lookup suffices
        let wb = self.workbook.read();
        let ws = wb
            .get_sheet_by_name(sheet)
            .ok_or_else(|| Self::sheet_error(sheet))?;

        let mut data = SheetData::default();
        for cell in ws.get_cell_collection() {
            let coord = cell.get_coordinate();
            let col = *coord.get_col_num();
            let row = *coord.get_row_num();
            let Some(value) = Self::convert_cell_value(cell) else {
                continue;
            };
            data.cells.insert(
                (row, col),
                CellData {
                    value: Some(value),
                    style: Self::convert_style(cell),
                },
            );
        }
        for merged in ws.get_merge_cells() {
            match CellRange::parse(&merged.get_range()) {
                Ok(range) => data.merged_cells.push(range),
                Err(err) => tracing::debug!(sheet, %err, "ignoring unparseable merge range"),
            }
        }
        for column in ws.get_column_dimensions() {
            data.column_widths
                .insert(*column.get_col_num(), *column.get_width());
        }
        data.recompute_dimensions();
        Ok(data)
    }
}

impl SpreadsheetWriter for UmyaAdapter {
    type Error = XlsxError;

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        data: CellData,
    ) -> Result<(), Self::Error> {
        let mut wb = self.workbook.write();
        let ws = Self::sheet_mut(&mut wb, sheet)?;
        // umya uses (col,row)
        let cell = ws.get_cell_mut((col, row));
        match data.value {
            Some(CellValue::Number(n)) => {
                cell.set_value_number(n);
            }
            Some(CellValue::Int(i)) => {
                cell.set_value_number(i as f64);
            }
            Some(CellValue::Boolean(b)) => {
                cell.set_value_bool(b);
            }
            Some(CellValue::Text(s)) => {
                cell.set_value(s);
            }
            Some(CellValue::Error(code)) => {
                cell.set_value(code);
            }
            Some(ref v @ (CellValue::Date(_) | CellValue::DateTime(_))) => {
                // Dates are stored as serials; the number format makes them render as dates
                if let Some(serial) = v.as_serial_number() {
                    cell.set_value_number(serial);
                }
                Self::apply_style(ws, row, col, &CellStyle::date());
            }
            Some(CellValue::Empty) | None => {
                cell.set_blank();
            }
        }
        if let Some(style) = &data.style {
            Self::apply_style(ws, row, col, style);
        }
        Ok(())
    }

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<(), Self::Error> {
        let mut wb = self.workbook.write();
        let ws = Self::sheet_mut(&mut wb, sheet)?;
        ws.add_merge_cells(range.to_string());
        Ok(())
    }

    fn set_column_width(&mut self, sheet: &str, col: u32, width: f64) -> Result<(), Self::Error> {
        let mut wb = self.workbook.write();
        let ws = Self::sheet_mut(&mut wb, sheet)?;
        ws.get_column_dimension_by_number_mut(&col).set_width(width);
        Ok(())
    }

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        let mut wb = self.workbook.write();
        Self::sheet_mut(&mut wb, name).map(|_| ())
    }

    /// Deleting a sheet that does not exist is a no-op.
    fn delete_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        let mut wb = self.workbook.write();
        if wb.get_sheet_by_name(name).is_none() {
            return Ok(());
        }
        wb.remove_sheet_by_name(name)
            .map_err(|e| XlsxError::CellError(format!("cannot delete sheet `{name}`: {e}")))
    }

    fn save_to<'a>(&mut self, dest: SaveDestination<'a>) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut wb = self.workbook.write();
        // Force deserialize each sheet explicitly before writing
        let count = wb.get_sheet_count();
        for i in 0..count {
            wb.read_sheet(i);
        }
        match dest {
            SaveDestination::InPlace => {
                let path = self.original_path.as_ref().ok_or_else(|| {
                    XlsxError::Io(std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "InPlace save unavailable: no original path",
                    ))
                })?;
                umya_spreadsheet::writer::xlsx::write(&*wb, path)?;
                Ok(None)
            }
            SaveDestination::Path(p) => {
                umya_spreadsheet::writer::xlsx::write(&*wb, p)?;
                Ok(None)
            }
            SaveDestination::Writer(w) => {
                // The zip writer needs Seek, so buffer first
                let mut cursor = Cursor::new(Vec::new());
                umya_spreadsheet::writer::xlsx::write_writer(&*wb, &mut cursor)?;
                w.write_all(&cursor.into_inner()).map_err(XlsxError::Io)?;
                Ok(None)
            }
            SaveDestination::Bytes => {
                let mut cursor = Cursor::new(Vec::new());
                umya_spreadsheet::writer::xlsx::write_writer(&*wb, &mut cursor)?;
                Ok(Some(cursor.into_inner()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_date_format_code;

    #[test]
    fn date_format_detection() {
        assert!(is_date_format_code("yyyy-mm-dd"));
        assert!(is_date_format_code("d-mmm-yy"));
        assert!(is_date_format_code("[$-409]mm/dd/yyyy"));
        assert!(!is_date_format_code("General"));
        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("\"day\"0"));
    }
}
