use crate::schema::Schema;
use sheetbind_io::SheetData;

/// Leftmost column where `schema`'s headers appear, in order and adjacent,
/// on `header_row`. Header text is compared after trimming.
pub fn find_table(sheet: &SheetData, header_row: u32, schema: &Schema) -> Option<u32> {
    let width = schema.width();
    let max_col = sheet.max_col();
    if width == 0 || max_col < width {
        return None;
    }
    (1..=max_col - width + 1).find(|&start| {
        schema
            .headers()
            .zip(start..)
            .all(|(header, col)| sheet.value(header_row, col).normalized_text() == header.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnSpec;
    use sheetbind_common::CellValue;
    use sheetbind_io::CellData;

    fn sheet(cells: &[((u32, u32), &str)]) -> SheetData {
        let mut data = SheetData::default();
        for ((r, c), v) in cells {
            data.cells.insert((*r, *c), CellData::from_value(*v));
        }
        let max_row = cells.iter().map(|((r, _), _)| *r).max().unwrap_or(0);
        let max_col = cells.iter().map(|((_, c), _)| *c).max().unwrap_or(0);
        data.dimensions = Some((max_row, max_col));
        data
    }

    fn plants() -> Schema {
        Schema::builder("ManufacturingPlant")
            .column(ColumnSpec::text("factory_name").header("Factory Name"))
            .column(ColumnSpec::text("location").header("Location"))
            .build()
            .unwrap()
    }

    #[test]
    fn finds_moved_table() {
        let data = sheet(&[((2, 4), " Factory Name "), ((2, 5), "Location")]);
        assert_eq!(find_table(&data, 2, &plants()), Some(4));
    }

    #[test]
    fn leftmost_match_wins() {
        let data = sheet(&[
            ((2, 2), "Factory Name"),
            ((2, 3), "Location"),
            ((2, 7), "Factory Name"),
            ((2, 8), "Location"),
        ]);
        assert_eq!(find_table(&data, 2, &plants()), Some(2));
    }

    #[test]
    fn headers_must_be_adjacent_and_on_the_header_row() {
        let gapped = sheet(&[((2, 1), "Factory Name"), ((2, 3), "Location")]);
        assert_eq!(find_table(&gapped, 2, &plants()), None);
        let wrong_row = sheet(&[((3, 1), "Factory Name"), ((3, 2), "Location")]);
        assert_eq!(find_table(&wrong_row, 2, &plants()), None);
        assert_eq!(find_table(&SheetData::default(), 2, &plants()), None);
        assert_eq!(CellValue::Empty.normalized_text(), "");
    }
}
