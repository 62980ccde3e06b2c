// Integration test for Umya backend; run with `--features umya`.
use chrono::NaiveDate;
use sheetbind_io::{
    CellData, CellRange, CellStyle, CellValue, SpreadsheetReader, SpreadsheetWriter, UmyaAdapter,
};
use sheetbind_testkit::{build_workbook, set_bool, set_number, set_text};

#[test]
fn umya_reads_values_by_type() {
    let fixture = build_workbook(|book| {
        set_text(book, "Sheet1", 1, 1, "Make");
        set_number(book, "Sheet1", 2, 1, 2020.0);
        set_bool(book, "Sheet1", 3, 1, true);
        set_text(book, "Sheet1", 1, 3, "Model");
    });

    let mut adapter = UmyaAdapter::open_path(fixture.path()).unwrap();
    let sheet = adapter.read_sheet("Sheet1").unwrap();
    assert_eq!(sheet.value(1, 1), &CellValue::Text("Make".into()));
    assert_eq!(sheet.value(2, 1), &CellValue::Number(2020.0));
    assert_eq!(sheet.value(3, 1), &CellValue::Boolean(true));
    assert_eq!(sheet.value(1, 3), &CellValue::Text("Model".into()));
    assert_eq!(sheet.value(9, 9), &CellValue::Empty);
    assert_eq!(sheet.dimensions, Some((3, 3)));
}

#[test]
fn umya_write_merge_style_and_width_survive_save() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("styled.xlsx");

    let mut adapter = UmyaAdapter::new();
    adapter.create_sheet("Cars").unwrap();
    adapter.delete_sheet("Sheet1").unwrap();
    adapter
        .write_cell(
            "Cars",
            1,
            1,
            CellData::from_value("Cars").with_style(CellStyle::title()),
        )
        .unwrap();
    adapter.merge_cells("Cars", CellRange::new(1, 1, 1, 3)).unwrap();
    adapter
        .write_cell(
            "Cars",
            2,
            1,
            CellData::from_value("Make").with_style(CellStyle::bold()),
        )
        .unwrap();
    adapter.set_column_width("Cars", 1, 12.0).unwrap();
    adapter.save_as_path(&path).unwrap();

    let mut reopened = UmyaAdapter::open_path(&path).unwrap();
    assert_eq!(reopened.sheet_names().unwrap(), vec!["Cars".to_string()]);
    let sheet = reopened.read_sheet("Cars").unwrap();
    assert!(sheet.is_merged(&CellRange::new(1, 1, 1, 3)));
    let title = sheet.cells.get(&(1, 1)).unwrap();
    assert!(title.is_bold());
    assert!(title.style.as_ref().unwrap().centered);
    assert!(sheet.cells.get(&(2, 1)).unwrap().is_bold());
    assert_eq!(sheet.column_widths.get(&1).copied(), Some(12.0));
}

#[test]
fn umya_dates_round_trip_through_serials() {
    let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let mut adapter = UmyaAdapter::new();
    adapter
        .write_cell("Sheet1", 1, 1, CellData::from_value(d))
        .unwrap();
    let bytes = adapter.save_to_bytes().unwrap();
    assert!(bytes.len() > 100, "Expected non-trivial XLSX byte output");

    let mut reopened = UmyaAdapter::open_bytes(bytes).unwrap();
    let cell = reopened.read_cell("Sheet1", 1, 1).unwrap().unwrap();
    assert_eq!(cell.value, Some(CellValue::Date(d)));
}

#[test]
fn umya_missing_sheet_is_an_error() {
    let mut adapter = UmyaAdapter::new();
    let err = adapter.read_sheet("Nope").unwrap_err();
    assert!(err.to_string().contains("Nope"), "unexpected error: {err}");
}

#[test]
fn umya_in_place_save_requires_original_path() {
    let mut adapter = UmyaAdapter::new();
    let err = adapter
        .save()
        .expect_err("new adapters have nowhere to save in place");
    assert!(err.to_string().contains("no original path"), "unexpected error: {err}");
}

#[test]
fn umya_delete_sheet_ignores_unknown_names() {
    let mut adapter = UmyaAdapter::new();
    adapter.create_sheet("Cars").unwrap();
    adapter.delete_sheet("Nope").unwrap();
    assert!(adapter.has_sheet("Sheet1").unwrap());

    adapter.delete_sheet("Sheet1").unwrap();
    assert!(!adapter.has_sheet("Sheet1").unwrap());
    assert_eq!(adapter.sheet_names().unwrap(), vec!["Cars".to_string()]);
}
