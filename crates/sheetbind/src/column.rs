//! Column descriptors and the coercion rules that turn raw cell values into
//! typed field values.

use crate::record::FieldValue;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use sheetbind_common::{CellValue, serial_to_datetime};
use std::collections::BTreeSet;
use std::fmt;

/// Extra check run on a coerced value. Returns a message on rejection.
pub type ColumnValidator = fn(&FieldValue) -> Result<(), String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Int,
    Bool,
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
        })
    }
}

/// How one field maps to one worksheet column.
#[derive(Clone)]
pub struct ColumnSpec {
    name: String,
    header: Option<String>,
    kind: ColumnType,
    not_null: bool,
    excludes: BTreeSet<String>,
    strip: bool,
    allow_empty: bool,
    validator: Option<ColumnValidator>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            header: None,
            kind,
            not_null: false,
            excludes: BTreeSet::new(),
            strip: true,
            allow_empty: false,
            validator: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date)
    }

    /// Header text written in the template. Defaults to the field name.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Rows whose raw value in this column matches any of `values` are skipped.
    pub fn excludes<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(values.into_iter().map(Into::into));
        self
    }

    /// Text columns only. Stripping is on unless turned off here.
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Date columns only: empty cells become null instead of failing.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn validator(mut self, validator: ColumnValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header_text(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.excludes
    }

    /// True when the raw cell value marks the row as excluded.
    pub fn is_excluded(&self, raw: &CellValue) -> bool {
        if self.excludes.is_empty() || matches!(raw, CellValue::Empty) {
            return false;
        }
        self.excludes.contains(&raw.to_string())
    }

    /// Coerce a raw cell value according to the column type.
    pub fn coerce(&self, raw: &CellValue) -> Result<FieldValue, String> {
        match self.kind {
            ColumnType::Text => Ok(FieldValue::Text(coerce_text(raw, self.strip))),
            ColumnType::Int => coerce_int(raw).map(FieldValue::Int),
            ColumnType::Bool => coerce_bool(raw).map(FieldValue::Bool),
            ColumnType::Date => match coerce_date(raw)? {
                Some(d) => Ok(FieldValue::Date(d)),
                None if self.allow_empty => Ok(FieldValue::Null),
                None => Err("value is empty".to_string()),
            },
        }
    }

    /// Not-null check followed by the custom validator, if any.
    pub fn check(&self, value: &FieldValue) -> Result<(), ColumnCheck> {
        if self.not_null && value.is_missing() {
            return Err(ColumnCheck::Null);
        }
        if let Some(validator) = self.validator {
            validator(value).map_err(ColumnCheck::Rejected)?;
        }
        Ok(())
    }
}

/// Why [`ColumnSpec::check`] refused a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnCheck {
    Null,
    Rejected(String),
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("header", &self.header_text())
            .field("kind", &self.kind)
            .field("not_null", &self.not_null)
            .field("excludes", &self.excludes)
            .field("strip", &self.strip)
            .field("allow_empty", &self.allow_empty)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

pub fn coerce_text(raw: &CellValue, strip: bool) -> String {
    let text = match raw {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        other => other.to_string(),
    };
    if strip {
        text.trim().to_string()
    } else {
        text
    }
}

/// Empty cells read as `0`; fractional numbers are rejected.
pub fn coerce_int(raw: &CellValue) -> Result<i64, String> {
    match raw {
        CellValue::Empty => Ok(0),
        CellValue::Int(i) => Ok(*i),
        CellValue::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Ok(*n as i64)
            } else {
                Err("not an integer".to_string())
            }
        }
        CellValue::Boolean(b) => Ok(i64::from(*b)),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<i64>().map_err(|_| "not an integer".to_string())
        }
        CellValue::Date(_) | CellValue::DateTime(_) => Err("dates are not integers".to_string()),
        CellValue::Error(code) => Err(format!("cell holds error {code}")),
    }
}

const TRUTHY: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSY: [&str; 5] = ["false", "f", "no", "n", "0"];

/// Empty cells read as `false`. Text is matched case-insensitively.
pub fn coerce_bool(raw: &CellValue) -> Result<bool, String> {
    match raw {
        CellValue::Empty => Ok(false),
        CellValue::Boolean(b) => Ok(*b),
        CellValue::Int(1) => Ok(true),
        CellValue::Int(0) => Ok(false),
        CellValue::Number(n) if *n == 1.0 => Ok(true),
        CellValue::Number(n) if *n == 0.0 => Ok(false),
        CellValue::Text(s) => {
            let s = s.trim().to_lowercase();
            if s.is_empty() || FALSY.contains(&s.as_str()) {
                Ok(false)
            } else if TRUTHY.contains(&s.as_str()) {
                Ok(true)
            } else {
                Err("not a recognised boolean".to_string())
            }
        }
        _ => Err("not a recognised boolean".to_string()),
    }
}

/// Parsed as dates; the time part must be valid but is discarded, and an
/// offset keeps the calendar date as written.
const ISO_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Tried in order after ISO. `%m/%d` wins over `%d/%m` when both fit.
const DATE_FORMATS: [&str; 10] = [
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %Y",
    "%d %b %y",
    "%d/%b/%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d/%m/%Y",
    "%d/%m/%y",
];

/// `Ok(None)` means the cell was empty.
pub fn coerce_date(raw: &CellValue) -> Result<Option<NaiveDate>, String> {
    match raw {
        CellValue::Empty => Ok(None),
        CellValue::Date(d) => Ok(Some(*d)),
        CellValue::DateTime(dt) => Ok(Some(dt.date())),
        CellValue::Int(i) => serial_date(*i as f64).map(Some),
        CellValue::Number(n) => serial_date(*n).map(Some),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            parse_date_text(s)
                .map(Some)
                .ok_or_else(|| "unrecognised date format".to_string())
        }
        CellValue::Boolean(_) => Err("booleans are not dates".to_string()),
        CellValue::Error(code) => Err(format!("cell holds error {code}")),
    }
}

fn serial_date(serial: f64) -> Result<NaiveDate, String> {
    if serial < 1.0 {
        return Err("serial date out of range".to_string());
    }
    serial_to_datetime(serial)
        .map(|dt| dt.date())
        .ok_or_else(|| "serial date out of range".to_string())
}

pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Some(d) = parse_iso(s) {
        return Some(d);
    }
    let upper = s.to_uppercase();
    DATE_FORMATS.iter().find_map(|fmt| {
        let d = NaiveDate::parse_from_str(&upper, fmt).ok()?;
        // chrono's %Y happily reads `25` as year 25
        if fmt.contains("%Y") && !has_four_digit_year(&upper) {
            return None;
        }
        Some(d)
    })
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    if !s.get(..4).is_some_and(|y| y.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ISO_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn has_four_digit_year(s: &str) -> bool {
    s.split(|c: char| !c.is_ascii_digit())
        .any(|part| part.len() == 4)
}
