mod common;

use common::{Car, ManufacturingPlant, car, cars_file, cars_sheet};
use sheetbind::{
    CellLocation, ColumnSpec, DiscoveryPolicy, ExcelFile, LoadOptions, Record, Schema,
    SheetBindError, SheetSpec,
};
use sheetbind_testkit::{build_workbook, edit_workbook, set_number, set_text};
use std::path::Path;

fn fill_rows(path: &Path, rows: &[(u32, u32, &str)]) {
    edit_workbook(path, |book| {
        for (row, col, value) in rows {
            set_text(book, "Cars", *row, *col, value);
        }
    });
}

fn template(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("cars.xlsx");
    cars_file().generate_template(&path).unwrap();
    path
}

#[test]
fn loads_both_tables_from_filled_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(
        &path,
        &[
            (3, 1, "Toyota"),
            (3, 2, "Corolla"),
            (3, 3, "2019"),
            (4, 1, "Ford"),
            (4, 2, "Focus"),
            (3, 6, "Plant A"),
            (3, 7, "Detroit"),
            (4, 6, "Plant B"),
            (4, 7, "Toyota City"),
        ],
    );
    edit_workbook(&path, |book| set_number(book, "Cars", 4, 3, 2021.0));

    let mut file = cars_file();
    file.load_data(&path).unwrap();

    let cars = file.repository::<Car>().unwrap();
    assert_eq!(cars.all(), [car("Toyota", "Corolla", 2019), car("Ford", "Focus", 2021)]);
    let plants = file.repository::<ManufacturingPlant>().unwrap();
    assert_eq!(plants.len(), 2);
    assert_eq!(plants.get(1).unwrap().location, "Toyota City");
    assert_eq!(file.records("manufacturing_plants").unwrap().len(), 2);
}

#[test]
fn tables_are_found_after_being_moved() {
    let fixture = build_workbook(|book| {
        set_text(book, "Cars", 2, 2, "Factory Name");
        set_text(book, "Cars", 2, 3, "Location");
        set_text(book, "Cars", 3, 2, "Plant A");
        set_text(book, "Cars", 3, 3, "Detroit");
        set_text(book, "Cars", 2, 5, "Make");
        set_text(book, "Cars", 2, 6, "Model");
        set_text(book, "Cars", 2, 7, "Year");
        set_text(book, "Cars", 3, 5, "Honda");
        set_text(book, "Cars", 3, 6, "Civic");
        set_number(book, "Cars", 3, 7, 2020.0);
    });

    let mut file = cars_file();
    file.load_data(fixture.path()).unwrap();
    assert_eq!(file.repository::<Car>().unwrap().all(), [car("Honda", "Civic", 2020)]);
    assert_eq!(
        file.repository::<ManufacturingPlant>().unwrap().all()[0].factory_name,
        "Plant A"
    );
}

#[test]
fn longer_neighbour_does_not_extend_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(
        &path,
        &[
            (3, 1, "Toyota"),
            (3, 2, "Corolla"),
            (3, 3, "2019"),
            (3, 6, "Plant A"),
            (4, 6, "Plant B"),
            (5, 6, "Plant C"),
        ],
    );

    let mut file = cars_file();
    file.load_data(&path).unwrap();
    assert_eq!(file.repository::<Car>().unwrap().len(), 1);
    assert_eq!(file.repository::<ManufacturingPlant>().unwrap().len(), 3);
}

#[test]
fn excluded_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(
        &path,
        &[
            (3, 1, "Toyota"),
            (3, 3, "SKIP"),
            (4, 1, "Ford"),
            (4, 3, "2021"),
        ],
    );

    let mut file = cars_file();
    file.load_data(&path).unwrap();
    let cars = file.repository::<Car>().unwrap();
    assert_eq!(cars.all(), [car("Ford", "", 2021)]);
}

#[test]
fn bad_integer_aborts_with_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(&path, &[(3, 1, "Toyota"), (3, 3, "12.5")]);

    let err = cars_file().load_data(&path).unwrap_err();
    insta::assert_snapshot!(
        err,
        @r#"sheet `Cars` cell C3 (column `Year`): cannot read "12.5" as int: not an integer"#
    );
}

#[test]
fn required_text_reports_row_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(&path, &[(3, 1, "Toyota"), (4, 2, "Focus"), (4, 3, "2021")]);

    let err = cars_file().load_data(&path).unwrap_err();
    assert!(matches!(err, SheetBindError::NotNull { .. }), "{err}");
    assert_eq!(err.location(), Some(&CellLocation::cell("Cars", 4, 1, "Make")));
}

#[test]
fn model_validation_hook_rejects_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(&path, &[(3, 1, "Benz"), (3, 3, "1850")]);

    let err = cars_file().load_data(&path).unwrap_err();
    insta::assert_snapshot!(err, @"sheet `Cars` row 3: Car rejected the row: 1850 predates the automobile");
}

#[test]
fn failed_load_clears_previous_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(&path, &[(3, 1, "Toyota"), (3, 3, "2019")]);

    let mut file = cars_file();
    file.load_data(&path).unwrap();
    assert_eq!(file.repository::<Car>().unwrap().len(), 1);

    fill_rows(&path, &[(4, 1, "Ford"), (4, 3, "soon")]);
    assert!(file.load_data(&path).is_err());
    assert!(file.repository::<Car>().unwrap().is_empty());
}

#[test]
fn reload_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = template(&dir);
    fill_rows(&path, &[(3, 1, "Toyota"), (3, 3, "2019"), (3, 6, "Plant A")]);

    let mut file = cars_file();
    file.load_data(&path).unwrap();
    let first = file.repository::<Car>().unwrap().all().to_vec();
    file.load_data(&path).unwrap();
    assert_eq!(file.repository::<Car>().unwrap().all(), first.as_slice());
    assert_eq!(file.repository::<ManufacturingPlant>().unwrap().len(), 1);
}

#[test]
fn missing_sheet_is_an_error() {
    let fixture = build_workbook(|book| set_text(book, "Sheet1", 1, 1, "nothing here"));
    let err = cars_file().load_data(fixture.path()).unwrap_err();
    assert!(
        matches!(err, SheetBindError::MissingSheet { ref sheet } if sheet == "Cars"),
        "{err}"
    );
}

#[test]
fn missing_table_aborts_or_skips() {
    let fixture = build_workbook(|book| {
        set_text(book, "Cars", 2, 1, "Make");
        set_text(book, "Cars", 2, 2, "Model");
        set_text(book, "Cars", 2, 3, "Year");
        set_text(book, "Cars", 3, 1, "Toyota");
    });

    let err = cars_file().load_data(fixture.path()).unwrap_err();
    insta::assert_snapshot!(
        err,
        @"no `ManufacturingPlant` table on sheet `Cars`: expected headers [Factory Name, Location] in row 2"
    );

    let mut lenient = cars_file().with_options(LoadOptions {
        on_missing_table: DiscoveryPolicy::Skip,
    });
    lenient.load_data(fixture.path()).unwrap();
    assert_eq!(lenient.repository::<Car>().unwrap().len(), 1);
    assert!(lenient.repository::<ManufacturingPlant>().unwrap().is_empty());
}

#[test]
fn export_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xlsx");

    let mut file = cars_file();
    file.set_records(
        "cars",
        vec![
            Record::new().with("make", "Toyota").with("model", "Corolla").with("year", 2019),
            Record::new().with("make", "Ford").with("model", "Focus").with("year", 2021),
        ],
    )
    .unwrap();
    file.set_records(
        "manufacturing_plants",
        vec![Record::new().with("factory_name", "Plant A").with("location", "Detroit")],
    )
    .unwrap();
    file.export(&path).unwrap();

    let mut reloaded = cars_file();
    reloaded.load_data(&path).unwrap();
    assert_eq!(
        reloaded.repository::<Car>().unwrap().all(),
        file.repository::<Car>().unwrap().all()
    );
    assert_eq!(
        reloaded.repository::<ManufacturingPlant>().unwrap().all(),
        file.repository::<ManufacturingPlant>().unwrap().all()
    );
}

#[test]
fn untyped_schema_keeps_records() {
    let notes = Schema::builder("Note")
        .column(ColumnSpec::text("body").header("Body"))
        .column(ColumnSpec::bool("done").header("Done"))
        .build()
        .unwrap();
    let spec = SheetSpec::builder("Notes").schema(notes).build().unwrap();
    let mut file = ExcelFile::new(vec![spec]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xlsx");
    file.generate_template(&path).unwrap();
    edit_workbook(&path, |book| {
        set_text(book, "Notes", 3, 1, "call the plant");
        set_text(book, "Notes", 3, 2, "Y");
        set_text(book, "Notes", 4, 1, "order parts");
        set_text(book, "Notes", 4, 2, "no");
    });
    file.load_data(&path).unwrap();

    let notes = file.repository_named::<Record>("notes").unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.all()[0].bool("done").unwrap());
    assert!(!notes.all()[1].bool("done").unwrap());
}

#[test]
fn workbook_without_sheets_is_rejected() {
    let err = ExcelFile::new(Vec::new()).unwrap_err();
    insta::assert_snapshot!(err, @"configuration error: no sheets declared");
}

#[test]
fn duplicate_collections_and_sheets_are_rejected() {
    let err = ExcelFile::new(vec![cars_sheet(), cars_sheet()]).unwrap_err();
    assert!(matches!(err, SheetBindError::Layout { .. }), "{err}");

    let other = SheetSpec::builder("More Cars").model::<Car>().build().unwrap();
    let err = ExcelFile::new(vec![cars_sheet(), other]).unwrap_err();
    assert!(
        matches!(err, SheetBindError::DuplicateCollection { ref collection } if collection == "cars"),
        "{err}"
    );
}
