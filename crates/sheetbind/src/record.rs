use crate::error::ModelError;
use chrono::NaiveDate;
use sheetbind_common::CellValue;
use std::fmt;

/// A coerced column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
    /// Only produced by date columns that allow empty cells.
    Null,
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Bool(_) => "bool",
            FieldValue::Date(_) => "date",
            FieldValue::Text(_) => "text",
            FieldValue::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null or empty text. `Int(0)` and `Bool(false)` are values.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Cell value written back to a worksheet.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            FieldValue::Int(i) => CellValue::Int(*i),
            FieldValue::Bool(b) => CellValue::Boolean(*b),
            FieldValue::Date(d) => CellValue::Date(*d),
            FieldValue::Text(s) if s.is_empty() => CellValue::Empty,
            FieldValue::Text(s) => CellValue::Text(s.clone()),
            FieldValue::Null => CellValue::Empty,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One parsed table row: field values keyed by field name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling records for export.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, field: &str) -> Result<&FieldValue, ModelError> {
        self.get(field)
            .ok_or_else(|| ModelError::MissingField(field.to_string()))
    }

    pub fn text(&self, field: &str) -> Result<&str, ModelError> {
        match self.require(field)? {
            FieldValue::Text(s) => Ok(s),
            other => Err(wrong_type(field, "text", other)),
        }
    }

    pub fn int(&self, field: &str) -> Result<i64, ModelError> {
        match self.require(field)? {
            FieldValue::Int(i) => Ok(*i),
            other => Err(wrong_type(field, "int", other)),
        }
    }

    pub fn bool(&self, field: &str) -> Result<bool, ModelError> {
        match self.require(field)? {
            FieldValue::Bool(b) => Ok(*b),
            other => Err(wrong_type(field, "bool", other)),
        }
    }

    pub fn date(&self, field: &str) -> Result<NaiveDate, ModelError> {
        match self.require(field)? {
            FieldValue::Date(d) => Ok(*d),
            other => Err(wrong_type(field, "date", other)),
        }
    }

    /// Date that may be null (date columns with `allow_empty`).
    pub fn opt_date(&self, field: &str) -> Result<Option<NaiveDate>, ModelError> {
        match self.require(field)? {
            FieldValue::Date(d) => Ok(Some(*d)),
            FieldValue::Null => Ok(None),
            other => Err(wrong_type(field, "date", other)),
        }
    }
}

fn wrong_type(field: &str, expected: &'static str, found: &FieldValue) -> ModelError {
    ModelError::WrongType {
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let record = Record::new()
            .with("make", "Toyota")
            .with("year", 2019)
            .with("active", true)
            .with("built", date)
            .with("retired", None::<NaiveDate>);

        assert_eq!(record.text("make").unwrap(), "Toyota");
        assert_eq!(record.int("year").unwrap(), 2019);
        assert!(record.bool("active").unwrap());
        assert_eq!(record.date("built").unwrap(), date);
        assert_eq!(record.opt_date("retired").unwrap(), None);
        assert_eq!(
            record.int("make"),
            Err(ModelError::WrongType {
                field: "make".into(),
                expected: "int",
                found: "text"
            })
        );
        assert_eq!(
            record.text("colour"),
            Err(ModelError::MissingField("colour".into()))
        );
    }

    #[test]
    fn insert_replaces_and_keeps_order() {
        let mut record: Record = [("a", 1i64), ("b", 2)].into_iter().collect();
        record.insert("a", 10);
        let names: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(record.int("a").unwrap(), 10);
    }

    #[test]
    fn missing_values() {
        assert!(FieldValue::Null.is_missing());
        assert!(FieldValue::Text(String::new()).is_missing());
        assert!(!FieldValue::Int(0).is_missing());
        assert!(!FieldValue::Bool(false).is_missing());
    }
}
