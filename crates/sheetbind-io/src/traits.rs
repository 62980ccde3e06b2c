use serde::{Deserialize, Serialize};
use sheetbind_common::{CellRange, CellValue};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Number format applied to cells that hold dates.
pub const DATE_NUMBER_FORMAT: &str = "yyyy-mm-dd";

/// The small slice of cell formatting the mapping layer cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub centered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    pub fn title() -> Self {
        Self {
            bold: true,
            centered: true,
            number_format: None,
        }
    }

    pub fn date() -> Self {
        Self {
            number_format: Some(DATE_NUMBER_FORMAT.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellData {
    pub value: Option<CellValue>,
    pub style: Option<CellStyle>,
}

impl CellData {
    pub fn from_value<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: Some(value.into()),
            style: None,
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn is_bold(&self) -> bool {
        self.style.as_ref().is_some_and(|s| s.bold)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SheetData {
    pub cells: BTreeMap<(u32, u32), CellData>,
    /// `(max_row, max_col)` of the used area, 1-based.
    pub dimensions: Option<(u32, u32)>,
    pub merged_cells: Vec<CellRange>,
    pub column_widths: BTreeMap<u32, f64>,
}

impl SheetData {
    /// Value at a 1-based position; missing cells read as `Empty`.
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells
            .get(&(row, col))
            .and_then(|c| c.value.as_ref())
            .unwrap_or(&EMPTY)
    }

    pub fn max_row(&self) -> u32 {
        self.dimensions.map(|d| d.0).unwrap_or(0)
    }

    pub fn max_col(&self) -> u32 {
        self.dimensions.map(|d| d.1).unwrap_or(0)
    }

    pub fn is_merged(&self, range: &CellRange) -> bool {
        self.merged_cells.iter().any(|m| m == range)
    }

    pub(crate) fn recompute_dimensions(&mut self) {
        let dims = self.cells.keys().fold((0u32, 0u32), |acc, (r, c)| {
            (acc.0.max(*r), acc.1.max(*c))
        });
        self.dimensions = Some(dims);
    }
}

pub enum SaveDestination<'a> {
    InPlace,
    Path(&'a Path),
    Writer(&'a mut dyn Write),
    Bytes,
}

pub trait SpreadsheetReader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Result<Vec<String>, Self::Error>;

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn has_sheet(&self, sheet: &str) -> Result<bool, Self::Error> {
        Ok(self.sheet_names()?.iter().any(|n| n == sheet))
    }

    fn read_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
    ) -> Result<Option<CellData>, Self::Error> {
        // Default: fallback to range read
        let mut range = self.read_range(sheet, (row, col), (row, col))?;
        Ok(range.remove(&(row, col)))
    }

    fn read_range(
        &mut self,
        sheet: &str,
        start: (u32, u32),
        end: (u32, u32),
    ) -> Result<BTreeMap<(u32, u32), CellData>, Self::Error> {
        let data = self.read_sheet(sheet)?;
        Ok(data
            .cells
            .into_iter()
            .filter(|((r, c), _)| *r >= start.0 && *r <= end.0 && *c >= start.1 && *c <= end.1)
            .collect())
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error>;
}

pub trait SpreadsheetWriter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        data: CellData,
    ) -> Result<(), Self::Error>;

    fn merge_cells(&mut self, sheet: &str, range: CellRange) -> Result<(), Self::Error>;

    fn set_column_width(&mut self, sheet: &str, col: u32, width: f64) -> Result<(), Self::Error>;

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error>;
    fn delete_sheet(&mut self, name: &str) -> Result<(), Self::Error>;

    fn save_to<'a>(&mut self, dest: SaveDestination<'a>) -> Result<Option<Vec<u8>>, Self::Error>;

    fn save(&mut self) -> Result<(), Self::Error> {
        self.save_to(SaveDestination::InPlace).map(|_| ())
    }

    fn save_as_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        self.save_to(SaveDestination::Path(path.as_ref()))
            .map(|_| ())
    }

    fn save_to_bytes(&mut self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.save_to(SaveDestination::Bytes)?.unwrap_or_default())
    }
}
