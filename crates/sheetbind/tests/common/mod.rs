#![allow(dead_code)]

use sheetbind::{ColumnSpec, ExcelFile, FromRecord, Model, ModelError, Record, SheetSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub make: String,
    pub model: String,
    pub year: i64,
}

impl FromRecord for Car {
    fn from_record(r: &Record) -> Result<Self, ModelError> {
        Ok(Car {
            make: r.text("make")?.to_string(),
            model: r.text("model")?.to_string(),
            year: r.int("year")?,
        })
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.year != 0 && self.year < 1886 {
            return Err(ModelError::invalid(format!(
                "{} predates the automobile",
                self.year
            )));
        }
        Ok(())
    }
}

impl Model for Car {
    const NAME: &'static str = "Car";

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::text("make").header("Make").not_null(),
            ColumnSpec::text("model").header("Model"),
            ColumnSpec::int("year").header("Year").excludes(["SKIP"]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturingPlant {
    pub factory_name: String,
    pub location: String,
}

impl FromRecord for ManufacturingPlant {
    fn from_record(r: &Record) -> Result<Self, ModelError> {
        Ok(ManufacturingPlant {
            factory_name: r.text("factory_name")?.to_string(),
            location: r.text("location")?.to_string(),
        })
    }
}

impl Model for ManufacturingPlant {
    const NAME: &'static str = "ManufacturingPlant";

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::text("factory_name").header("Factory Name"),
            ColumnSpec::text("location").header("Location"),
        ]
    }
}

pub fn cars_sheet() -> SheetSpec {
    SheetSpec::builder("Cars")
        .model::<Car>()
        .model::<ManufacturingPlant>()
        .build()
        .unwrap()
}

pub fn cars_file() -> ExcelFile {
    ExcelFile::new(vec![cars_sheet()]).unwrap()
}

pub fn car(make: &str, model: &str, year: i64) -> Car {
    Car {
        make: make.into(),
        model: model.into(),
        year,
    }
}
