//! Load options and file-based workbook descriptions.

use crate::error::{Result, SheetBindError};
use crate::schema::SchemaRegistry;
use crate::sheet::{
    DEFAULT_DATA_START_ROW, DEFAULT_HEADER_ROW, DEFAULT_TABLE_GAP, DEFAULT_TITLE_ROW, SheetSpec,
};
use crate::workbook::ExcelFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when a declared table's headers cannot be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    /// Fail the load.
    #[default]
    Abort,
    /// Leave that table's repository empty and carry on.
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default)]
    pub on_missing_table: DiscoveryPolicy,
}

impl LoadOptions {
    pub fn lenient() -> Self {
        Self {
            on_missing_table: DiscoveryPolicy::Skip,
        }
    }
}

/// Serializable description of a workbook's sheets.
///
/// ```yaml
/// sheets:
///   - name: Cars
///     models: [Car, ManufacturingPlant]
///     table_gap: 2
/// load:
///   on_missing_table: skip
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookConfig {
    pub sheets: Vec<SheetConfig>,
    #[serde(default)]
    pub load: LoadOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub name: String,
    /// Model names or collection keys, looked up in a [`SchemaRegistry`].
    pub models: Vec<String>,
    #[serde(default = "default_title_row")]
    pub title_row: u32,
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_data_start_row")]
    pub data_start_row: u32,
    #[serde(default = "default_table_gap")]
    pub table_gap: u32,
}

fn default_title_row() -> u32 {
    DEFAULT_TITLE_ROW
}

fn default_header_row() -> u32 {
    DEFAULT_HEADER_ROW
}

fn default_data_start_row() -> u32 {
    DEFAULT_DATA_START_ROW
}

fn default_table_gap() -> u32 {
    DEFAULT_TABLE_GAP
}

impl WorkbookConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read a config file; `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SheetBindError::Config(format!("{}: {e}", path.display())))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Turn the description into an [`ExcelFile`], resolving every model
    /// name against `registry`.
    pub fn resolve(&self, registry: &SchemaRegistry) -> Result<ExcelFile> {
        let mut sheets = Vec::with_capacity(self.sheets.len());
        for sheet in &self.sheets {
            let mut builder = SheetSpec::builder(&sheet.name)
                .title_row(sheet.title_row)
                .header_row(sheet.header_row)
                .data_start_row(sheet.data_start_row)
                .table_gap(sheet.table_gap);
            for model in &sheet.models {
                builder = builder.entry(registry.resolve(model)?);
            }
            let spec = builder.build().map_err(|e| match e {
                SheetBindError::Layout { sheet, message } => {
                    SheetBindError::Config(format!("sheet `{sheet}`: {message}"))
                }
                other => other,
            })?;
            sheets.push(spec);
        }
        Ok(ExcelFile::new(sheets)?.with_options(self.load))
    }
}
