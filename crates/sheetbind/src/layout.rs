//! Horizontal placement of tables on a sheet.

use crate::error::{Result, SheetBindError};
use crate::sheet::SheetSpec;
use sheetbind_common::{CellRange, column_to_letters};

/// Position of one table in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub model: String,
    pub collection: String,
    pub title: String,
    /// 1-based first column.
    pub start_col: u32,
    pub width: u32,
    pub title_row: u32,
    pub header_row: u32,
    pub data_start_row: u32,
}

impl TableLayout {
    pub fn end_col(&self) -> u32 {
        self.start_col + self.width - 1
    }

    /// The title span, e.g. `A1:C1`.
    pub fn title_range(&self) -> CellRange {
        CellRange::new(self.title_row, self.start_col, self.title_row, self.end_col())
    }

    pub fn columns(&self) -> std::ops::RangeInclusive<u32> {
        self.start_col..=self.end_col()
    }

    pub fn start_letters(&self) -> String {
        column_to_letters(self.start_col)
    }
}

/// Start column of each table, given their widths and the gap between them.
///
/// The first table starts in column 1 and every following table starts
/// `gap` columns after the previous one ends.
pub fn plan_columns(widths: &[u32], gap: u32) -> std::result::Result<Vec<u32>, String> {
    let mut starts = Vec::with_capacity(widths.len());
    let mut next = 1u32;
    for (i, &width) in widths.iter().enumerate() {
        if width == 0 {
            return Err(format!("table {} has no columns", i + 1));
        }
        starts.push(next);
        next = next
            .checked_add(width)
            .and_then(|n| n.checked_add(gap))
            .ok_or_else(|| "tables run past the last column".to_string())?;
    }
    Ok(starts)
}

/// Lay out every table declared on `spec`, in declaration order.
pub fn compute_layouts(spec: &SheetSpec) -> Result<Vec<TableLayout>> {
    let widths: Vec<u32> = spec.schemas().map(|s| s.width()).collect();
    let starts = plan_columns(&widths, spec.table_gap()).map_err(|message| SheetBindError::Layout {
        sheet: spec.name().to_string(),
        message,
    })?;
    Ok(spec
        .schemas()
        .zip(starts)
        .map(|(schema, start_col)| TableLayout {
            model: schema.name().to_string(),
            collection: schema.collection().to_string(),
            title: schema.title().to_string(),
            start_col,
            width: schema.width(),
            title_row: spec.title_row(),
            header_row: spec.header_row(),
            data_start_row: spec.data_start_row(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnSpec;
    use crate::schema::Schema;

    #[test]
    fn plans_gapped_columns() {
        assert_eq!(plan_columns(&[3, 2], 2).unwrap(), vec![1, 6]);
        assert_eq!(plan_columns(&[1, 1, 4], 0).unwrap(), vec![1, 2, 3]);
        assert_eq!(plan_columns(&[], 2).unwrap(), Vec::<u32>::new());
        assert!(plan_columns(&[2, 0], 2).is_err());
    }

    #[test]
    fn sheet_without_tables_has_no_layouts() {
        let spec = SheetSpec::builder("Blank").build().unwrap();
        assert!(compute_layouts(&spec).unwrap().is_empty());
    }

    #[test]
    fn cars_and_plants_layout() {
        let cars = Schema::builder("Car")
            .column(ColumnSpec::text("make").header("Make"))
            .column(ColumnSpec::text("model").header("Model"))
            .column(ColumnSpec::int("year").header("Year"))
            .build()
            .unwrap();
        let plants = Schema::builder("ManufacturingPlant")
            .column(ColumnSpec::text("factory_name").header("Factory Name"))
            .column(ColumnSpec::text("location").header("Location"))
            .build()
            .unwrap();
        let spec = SheetSpec::builder("Cars")
            .schema(cars)
            .schema(plants)
            .build()
            .unwrap();

        let layouts = compute_layouts(&spec).unwrap();
        let ranges: Vec<String> = layouts.iter().map(|l| l.title_range().to_string()).collect();
        assert_eq!(ranges, ["A1:C1", "F1:G1"]);
        assert_eq!(layouts[1].title, "Manufacturing Plants");
        assert_eq!(layouts[1].start_letters(), "F");
        assert_eq!(layouts[1].columns().collect::<Vec<_>>(), vec![6, 7]);
    }
}
