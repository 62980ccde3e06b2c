use crate::column::ColumnCheck;
use crate::error::{CellLocation, Result, SheetBindError};
use crate::record::Record;
use crate::schema::Schema;
use sheetbind_common::CellValue;
use sheetbind_io::SheetData;

/// Counts reported by [`parse_table`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub rows: usize,
    pub excluded: usize,
}

/// Read data rows of one located table, starting at `data_start_row`.
///
/// Reading stops at the first row whose cells are all blank within the
/// table's columns. Cells outside the table are never looked at, so a
/// neighbouring table that runs longer does not keep this one going.
/// Each row is checked for exclusion first, then every cell is coerced,
/// null-checked and validated, and the finished record is handed to
/// `on_row` with its 1-based row number. The first failure aborts.
pub fn parse_table<F>(
    sheet_name: &str,
    sheet: &SheetData,
    schema: &Schema,
    start_col: u32,
    data_start_row: u32,
    mut on_row: F,
) -> Result<ParseSummary>
where
    F: FnMut(u32, Record) -> Result<()>,
{
    let mut summary = ParseSummary::default();
    let columns = schema.columns();
    let mut row = data_start_row;

    while row <= sheet.max_row() {
        let raw: Vec<&CellValue> = (start_col..start_col + schema.width())
            .map(|col| sheet.value(row, col))
            .collect();
        if raw.iter().all(|v| v.is_blank()) {
            break;
        }

        if let Some(column) = columns
            .iter()
            .zip(&raw)
            .find_map(|(column, value)| column.is_excluded(value).then_some(column))
        {
            tracing::debug!(sheet = sheet_name, row, column = column.header_text(), "row excluded");
            summary.excluded += 1;
            row += 1;
            continue;
        }

        let mut record = Record::new();
        for ((column, value), col) in columns.iter().zip(&raw).zip(start_col..) {
            let location = || CellLocation::cell(sheet_name, row, col, column.header_text());
            let field = column
                .coerce(value)
                .map_err(|reason| SheetBindError::Coercion {
                    location: location(),
                    expected: column.kind(),
                    raw: value.to_string(),
                    reason,
                })?;
            column.check(&field).map_err(|check| match check {
                ColumnCheck::Null => SheetBindError::NotNull {
                    location: location(),
                    raw: value.to_string(),
                },
                ColumnCheck::Rejected(message) => SheetBindError::Validation {
                    location: location(),
                    model: schema.name().to_string(),
                    message,
                },
            })?;
            record.insert(column.name(), field);
        }
        on_row(row, record)?;
        summary.rows += 1;
        row += 1;
    }
    Ok(summary)
}
