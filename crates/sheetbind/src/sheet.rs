use crate::error::{Result, SheetBindError};
use crate::schema::{Model, ModelEntry, Schema};

pub const DEFAULT_TITLE_ROW: u32 = 1;
pub const DEFAULT_HEADER_ROW: u32 = 2;
pub const DEFAULT_DATA_START_ROW: u32 = 3;
pub const DEFAULT_TABLE_GAP: u32 = 2;

/// One worksheet and the tables laid out side by side on it.
#[derive(Debug, Clone)]
pub struct SheetSpec {
    name: String,
    models: Vec<ModelEntry>,
    title_row: u32,
    header_row: u32,
    data_start_row: u32,
    table_gap: u32,
}

impl SheetSpec {
    pub fn builder(name: impl Into<String>) -> SheetSpecBuilder {
        SheetSpecBuilder {
            name: name.into(),
            models: Vec::new(),
            error: None,
            title_row: DEFAULT_TITLE_ROW,
            header_row: DEFAULT_HEADER_ROW,
            data_start_row: DEFAULT_DATA_START_ROW,
            table_gap: DEFAULT_TABLE_GAP,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.models.iter().map(ModelEntry::schema)
    }

    pub fn title_row(&self) -> u32 {
        self.title_row
    }

    pub fn header_row(&self) -> u32 {
        self.header_row
    }

    pub fn data_start_row(&self) -> u32 {
        self.data_start_row
    }

    pub fn table_gap(&self) -> u32 {
        self.table_gap
    }
}

pub struct SheetSpecBuilder {
    name: String,
    models: Vec<ModelEntry>,
    error: Option<SheetBindError>,
    title_row: u32,
    header_row: u32,
    data_start_row: u32,
    table_gap: u32,
}

impl SheetSpecBuilder {
    /// Add a table for `M`. Tables are laid out left to right in call order.
    pub fn model<M: Model>(mut self) -> Self {
        match ModelEntry::of::<M>() {
            Ok(entry) => self.models.push(entry),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Add a table whose rows are kept as untyped records.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.models.push(ModelEntry::untyped(schema));
        self
    }

    pub fn entry(mut self, entry: ModelEntry) -> Self {
        self.models.push(entry);
        self
    }

    pub fn title_row(mut self, row: u32) -> Self {
        self.title_row = row;
        self
    }

    pub fn header_row(mut self, row: u32) -> Self {
        self.header_row = row;
        self
    }

    pub fn data_start_row(mut self, row: u32) -> Self {
        self.data_start_row = row;
        self
    }

    pub fn table_gap(mut self, gap: u32) -> Self {
        self.table_gap = gap;
        self
    }

    pub fn build(self) -> Result<SheetSpec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let layout_err = |message: &str| SheetBindError::Layout {
            sheet: self.name.clone(),
            message: message.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(layout_err("sheet name is empty"));
        }
        if self.title_row < 1 {
            return Err(layout_err("rows are 1-based"));
        }
        if self.header_row <= self.title_row {
            return Err(layout_err("header row must be below the title row"));
        }
        if self.data_start_row <= self.header_row {
            return Err(layout_err("data must start below the header row"));
        }
        Ok(SheetSpec {
            name: self.name,
            models: self.models,
            title_row: self.title_row,
            header_row: self.header_row,
            data_start_row: self.data_start_row,
            table_gap: self.table_gap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnSpec;

    fn cars() -> Schema {
        Schema::builder("Car")
            .column(ColumnSpec::text("make").header("Make"))
            .build()
            .unwrap()
    }

    #[test]
    fn defaults() {
        let spec = SheetSpec::builder("Cars").schema(cars()).build().unwrap();
        assert_eq!(
            (spec.title_row(), spec.header_row(), spec.data_start_row(), spec.table_gap()),
            (1, 2, 3, 2)
        );
    }

    #[test]
    fn row_order_is_enforced() {
        let err = SheetSpec::builder("Cars")
            .schema(cars())
            .title_row(2)
            .header_row(2)
            .build()
            .unwrap_err();
        assert!(matches!(err, SheetBindError::Layout { .. }), "{err}");

        let err = SheetSpec::builder("Cars")
            .schema(cars())
            .data_start_row(2)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("data must start below"), "{err}");

        assert!(SheetSpec::builder("Cars").schema(cars()).title_row(0).build().is_err());
        assert!(SheetSpec::builder("").schema(cars()).build().is_err());
    }
}
