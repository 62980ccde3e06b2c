use crate::column::ColumnType;
use sheetbind_common::column_to_letters;
use std::fmt;
use thiserror::Error;

/// Where in a worksheet a row-level failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLocation {
    pub sheet: String,
    pub row: u32,
    /// `None` for failures that concern the row as a whole.
    pub col: Option<u32>,
    pub header: Option<String>,
}

impl CellLocation {
    pub fn cell(sheet: &str, row: u32, col: u32, header: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
            col: Some(col),
            header: Some(header.to_string()),
        }
    }

    pub fn row(sheet: &str, row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
            col: None,
            header: None,
        }
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.col, &self.header) {
            (Some(col), Some(header)) => write!(
                f,
                "sheet `{}` cell {}{} (column `{}`)",
                self.sheet,
                column_to_letters(col),
                self.row,
                header
            ),
            (Some(col), None) => write!(
                f,
                "sheet `{}` cell {}{}",
                self.sheet,
                column_to_letters(col),
                self.row
            ),
            _ => write!(f, "sheet `{}` row {}", self.sheet, self.row),
        }
    }
}

#[derive(Debug, Error)]
pub enum SheetBindError {
    #[error("invalid schema `{model}`: {message}")]
    Schema { model: String, message: String },

    #[error("invalid layout for sheet `{sheet}`: {message}")]
    Layout { sheet: String, message: String },

    #[error("collection `{collection}` is declared more than once")]
    DuplicateCollection { collection: String },

    #[error("workbook has no sheet named `{sheet}`")]
    MissingSheet { sheet: String },

    #[error("no `{model}` table on sheet `{sheet}`: expected headers [{headers}] in row {row}")]
    TableNotFound {
        sheet: String,
        model: String,
        row: u32,
        headers: String,
    },

    #[error("{location}: cannot read {raw:?} as {expected}: {reason}")]
    Coercion {
        location: CellLocation,
        expected: ColumnType,
        raw: String,
        reason: String,
    },

    #[error("{location}: value {raw:?} is not allowed to be empty")]
    NotNull { location: CellLocation, raw: String },

    #[error("{location}: {model} rejected the row: {message}")]
    Validation {
        location: CellLocation,
        model: String,
        message: String,
    },

    #[error("unknown model `{0}`")]
    UnknownModel(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{backend} error: {message}")]
    Io { backend: String, message: String },
}

impl SheetBindError {
    pub(crate) fn io<E: fmt::Display>(backend: &str, err: E) -> Self {
        SheetBindError::Io {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    /// The location of the offending cell or row, for row-level failures.
    pub fn location(&self) -> Option<&CellLocation> {
        match self {
            SheetBindError::Coercion { location, .. }
            | SheetBindError::NotNull { location, .. }
            | SheetBindError::Validation { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl From<sheetbind_io::IoError> for SheetBindError {
    fn from(err: sheetbind_io::IoError) -> Self {
        SheetBindError::io("spreadsheet", err)
    }
}

impl From<serde_yaml::Error> for SheetBindError {
    fn from(err: serde_yaml::Error) -> Self {
        SheetBindError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SheetBindError {
    fn from(err: serde_json::Error) -> Self {
        SheetBindError::Config(err.to_string())
    }
}

/// Failure raised while turning a parsed [`Record`](crate::Record) into a
/// model value, or by a model's own validation hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("record has no field `{0}`")]
    MissingField(String),

    #[error("field `{field}` holds {found}, expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Invalid(String),
}

impl ModelError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ModelError::Invalid(message.into())
    }
}

pub type Result<T, E = SheetBindError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_names_sheet_cell_and_header() {
        let loc = CellLocation::cell("Cars", 4, 3, "Year");
        assert_eq!(loc.to_string(), "sheet `Cars` cell C4 (column `Year`)");
        assert_eq!(CellLocation::row("Cars", 7).to_string(), "sheet `Cars` row 7");
    }

    #[test]
    fn coercion_message_carries_raw_value() {
        let err = SheetBindError::Coercion {
            location: CellLocation::cell("Cars", 3, 3, "Year"),
            expected: ColumnType::Int,
            raw: "abc".into(),
            reason: "not an integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "sheet `Cars` cell C3 (column `Year`): cannot read \"abc\" as int: not an integer"
        );
        assert_eq!(err.location().map(|l| l.row), Some(3));
    }
}
