//! Writes table titles, headers and (optionally) rows into a workbook.

use crate::error::{Result, SheetBindError};
use crate::layout::{TableLayout, compute_layouts};
use crate::record::{FieldValue, Record};
use crate::schema::Schema;
use crate::sheet::SheetSpec;
use sheetbind_io::{CellData, CellStyle, SpreadsheetWriter};

const MIN_COLUMN_WIDTH: f64 = 12.0;
const MAX_COLUMN_WIDTH: f64 = 40.0;
const COLUMN_PADDING: f64 = 4.0;

/// Width given to a column so its header fits with a little padding.
pub fn column_width(header: &str) -> f64 {
    (header.chars().count() as f64 + COLUMN_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

pub(crate) fn backend_name<W>() -> &'static str {
    let full = std::any::type_name::<W>();
    full.rsplit("::").next().unwrap_or(full)
}

fn write_err<W: SpreadsheetWriter>(err: W::Error) -> SheetBindError {
    SheetBindError::io(backend_name::<W>(), err)
}

/// Create `spec`'s sheet and write every table's title and header row.
///
/// Titles are bold, centred and merged across the table (single-column
/// tables are not merged). Headers are bold. Returns the layouts used.
pub fn write_sheet_template<W: SpreadsheetWriter>(
    writer: &mut W,
    spec: &SheetSpec,
) -> Result<Vec<TableLayout>> {
    let layouts = compute_layouts(spec)?;
    let sheet = spec.name();
    writer.create_sheet(sheet).map_err(write_err::<W>)?;

    for (layout, schema) in layouts.iter().zip(spec.schemas()) {
        tracing::debug!(
            sheet,
            table = %layout.title,
            range = %layout.title_range(),
            "writing table header"
        );
        writer
            .write_cell(
                sheet,
                layout.title_row,
                layout.start_col,
                CellData::from_value(layout.title.as_str()).with_style(CellStyle::title()),
            )
            .map_err(write_err::<W>)?;
        if layout.width > 1 {
            writer
                .merge_cells(sheet, layout.title_range())
                .map_err(write_err::<W>)?;
        }
        for (col, column) in layout.columns().zip(schema.columns()) {
            let header = column.header_text();
            writer
                .write_cell(
                    sheet,
                    layout.header_row,
                    col,
                    CellData::from_value(header).with_style(CellStyle::bold()),
                )
                .map_err(write_err::<W>)?;
            writer
                .set_column_width(sheet, col, column_width(header))
                .map_err(write_err::<W>)?;
        }
    }
    Ok(layouts)
}

/// Write `records` below a table's header, one row each, in order.
pub fn write_table_rows<W: SpreadsheetWriter>(
    writer: &mut W,
    sheet: &str,
    layout: &TableLayout,
    schema: &Schema,
    records: &[Record],
) -> Result<()> {
    for (offset, record) in records.iter().enumerate() {
        let row = layout.data_start_row + offset as u32;
        for (col, column) in layout.columns().zip(schema.columns()) {
            let Some(value) = record.get(column.name()) else {
                continue;
            };
            let mut cell = CellData::from_value(value.to_cell_value());
            if matches!(value, FieldValue::Date(_)) {
                cell = cell.with_style(CellStyle::date());
            }
            writer.write_cell(sheet, row, col, cell).map_err(write_err::<W>)?;
        }
    }
    Ok(())
}
