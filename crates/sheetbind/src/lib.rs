//! Schema-driven mapping between typed records and spreadsheet worksheets.
//!
//! A worksheet holds one or more tables laid out left to right. Each table
//! has a merged title, a header row and data rows below it, and is described
//! by a [`Schema`]: an ordered list of [`ColumnSpec`]s. From the same
//! description the crate can
//!
//! - write a blank template ([`ExcelFile::generate_template`]),
//! - read filled-in workbooks back into typed [`Repository`]s
//!   ([`ExcelFile::load_data`]), locating each table by its headers so
//!   users may move tables around,
//! - write records back out ([`ExcelFile::export`]).
//!
//! Workbook access goes through the [`sheetbind_io`] reader and writer
//! traits, so any backend works with [`ExcelFile::write_template`] and
//! [`ExcelFile::load_from`].

pub mod column;
pub mod config;
mod error;
pub mod layout;
pub mod locator;
pub mod naming;
pub mod parser;
mod record;
mod repository;
mod schema;
pub mod sheet;
pub mod template;
mod workbook;

pub use column::{ColumnSpec, ColumnType, ColumnValidator};
pub use config::{DiscoveryPolicy, LoadOptions, SheetConfig, WorkbookConfig};
pub use error::{CellLocation, ModelError, Result, SheetBindError};
pub use layout::{TableLayout, compute_layouts};
pub use record::{FieldValue, Record};
pub use repository::{Repositories, Repository};
pub use schema::{FromRecord, Model, ModelEntry, Schema, SchemaBuilder, SchemaRegistry};
pub use sheet::{SheetSpec, SheetSpecBuilder};
pub use workbook::ExcelFile;

pub use sheetbind_common::CellValue;
pub use sheetbind_io;
