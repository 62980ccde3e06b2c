use crate::IoError;
use crate::traits::{
    CellData, CellStyle, SaveDestination, SheetData, SpreadsheetReader, SpreadsheetWriter,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sheetbind_common::{CellRange, CellValue};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
struct JsonWorkbook {
    #[serde(default = "default_version")]
    version: u32,
    /// Kept as a list so sheet order survives a round trip.
    #[serde(default)]
    sheets: Vec<JsonSheet>,
}

impl Default for JsonWorkbook {
    fn default() -> Self {
        Self {
            version: default_version(),
            sheets: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
struct JsonSheet {
    name: String,
    #[serde(default)]
    cells: Vec<JsonCell>,
    #[serde(default)]
    merged_cells: Vec<CellRange>,
    #[serde(default)]
    column_widths: BTreeMap<u32, f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct JsonCell {
    row: u32,
    col: u32,
    #[serde(default)]
    value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<CellStyle>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "value")]
enum JsonValue {
    Int(i64),
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
    Date(String),
    DateTime(String),
    Error(String),
}

/// Workbook persisted as a JSON document. Everything lives in memory, which
/// also makes this the backend of choice for tests that never touch xlsx.
pub struct JsonAdapter {
    data: JsonWorkbook,
    path: Option<PathBuf>,
}

impl Default for JsonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonAdapter {
    pub fn new() -> Self {
        Self {
            data: JsonWorkbook::default(),
            path: None,
        }
    }

    fn to_sheet_data(js: &JsonSheet) -> SheetData {
        let mut data = SheetData {
            merged_cells: js.merged_cells.clone(),
            column_widths: js.column_widths.clone(),
            ..Default::default()
        };
        for c in &js.cells {
            let value = c.value.as_ref().map(json_to_value);
            if value.is_none() && c.style.is_none() {
                continue;
            }
            data.cells.insert(
                (c.row, c.col),
                CellData {
                    value,
                    style: c.style.clone(),
                },
            );
        }
        data.recompute_dimensions();
        data
    }

    fn sheet(&self, name: &str) -> Option<&JsonSheet> {
        self.data.sheets.iter().find(|s| s.name == name)
    }

    fn ensure_sheet_mut(&mut self, name: &str) -> &mut JsonSheet {
        let idx = match self.data.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.data.sheets.push(JsonSheet {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.data.sheets.len() - 1
            }
        };
        &mut self.data.sheets[idx]
    }

    fn write_json<W: Write>(&self, writer: W) -> Result<(), IoError> {
        serde_json::to_writer_pretty(writer, &self.data)?;
        Ok(())
    }
}

impl SpreadsheetReader for JsonAdapter {
    type Error = IoError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.data.sheets.iter().map(|s| s.name.clone()).collect())
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let data: JsonWorkbook = serde_json::from_reader(reader)?;
        Ok(JsonAdapter {
            data,
            path: Some(path.as_ref().to_path_buf()),
        })
    }

    fn open_bytes(bytes: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let data: JsonWorkbook = serde_json::from_slice(&bytes)?;
        Ok(JsonAdapter { data, path: None })
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        self.sheet(sheet)
            .map(Self::to_sheet_data)
            .ok_or_else(|| IoError::SheetNotFound(sheet.to_string()))
    }
}

impl SpreadsheetWriter for JsonAdapter {
    type Error = IoError;

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        data: CellData,
    ) -> Result<(), Self::Error> {
        let value = data.value.as_ref().map(value_to_json);
        let sheet_entry = self.ensure_sheet_mut(sheet);
        if let Some(cell) = sheet_entry
            .cells
            .iter_mut()
            .find(|c| c.row == row && c.col == col)
        {
            cell.value = value;
            if data.style.is_some() {
                cell.style = data.style;
            }
        } else {
            sheet_entry.cells.push(JsonCell {
                row,
                col,
                value,
                style: data.style,
            });
        }
        Ok(())
    }

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<(), Self::Error> {
        let sheet_entry = self.ensure_sheet_mut(sheet);
        if !sheet_entry.merged_cells.contains(&range) {
            sheet_entry.merged_cells.push(range);
        }
        Ok(())
    }

    fn set_column_width(&mut self, sheet: &str, col: u32, width: f64) -> Result<(), Self::Error> {
        self.ensure_sheet_mut(sheet).column_widths.insert(col, width);
        Ok(())
    }

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        self.ensure_sheet_mut(name);
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        self.data.sheets.retain(|s| s.name != name);
        Ok(())
    }

    fn save_to<'a>(&mut self, dest: SaveDestination<'a>) -> Result<Option<Vec<u8>>, Self::Error> {
        match dest {
            SaveDestination::InPlace => {
                let path = self.path.as_ref().ok_or_else(|| {
                    IoError::Unsupported("in-place save without an original path".to_string())
                })?;
                self.write_json(File::create(path)?)?;
                Ok(None)
            }
            SaveDestination::Path(path) => {
                self.write_json(File::create(path)?)?;
                self.path = Some(path.to_path_buf());
                Ok(None)
            }
            SaveDestination::Writer(writer) => {
                self.write_json(writer)?;
                Ok(None)
            }
            SaveDestination::Bytes => Ok(Some(serde_json::to_vec_pretty(&self.data)?)),
        }
    }
}

fn value_to_json(v: &CellValue) -> JsonValue {
    match v {
        CellValue::Int(i) => JsonValue::Int(*i),
        CellValue::Number(n) => JsonValue::Number(*n),
        CellValue::Text(s) => JsonValue::Text(s.clone()),
        CellValue::Boolean(b) => JsonValue::Boolean(*b),
        CellValue::Empty => JsonValue::Empty,
        CellValue::Date(d) => JsonValue::Date(d.format("%Y-%m-%d").to_string()),
        CellValue::DateTime(dt) => JsonValue::DateTime(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        CellValue::Error(code) => JsonValue::Error(code.clone()),
    }
}

/// Unparseable date strings degrade to text rather than failing the read.
fn json_to_value(v: &JsonValue) -> CellValue {
    match v {
        JsonValue::Int(i) => CellValue::Int(*i),
        JsonValue::Number(n) => CellValue::Number(*n),
        JsonValue::Text(s) => CellValue::Text(s.clone()),
        JsonValue::Boolean(b) => CellValue::Boolean(*b),
        JsonValue::Empty => CellValue::Empty,
        JsonValue::Date(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        JsonValue::DateTime(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        JsonValue::Error(code) => CellValue::Error(code.clone()),
    }
}
