use crate::column::ColumnSpec;
use crate::error::{ModelError, Result, SheetBindError};
use crate::naming;
use crate::record::Record;
use crate::repository::{ErasedRepository, Repository};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Ordered column descriptors for one model, plus the names derived from it.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    collection: String,
    title: String,
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Validates that the schema has at least one column and that field
    /// names and headers are unique.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self> {
        let name = name.into();
        let invalid = |message: String| SheetBindError::Schema {
            model: name.clone(),
            message,
        };
        if name.trim().is_empty() {
            return Err(invalid("model name is empty".to_string()));
        }
        if columns.is_empty() {
            return Err(invalid("no columns declared".to_string()));
        }
        let mut fields = HashSet::new();
        let mut headers = HashSet::new();
        for col in &columns {
            if !fields.insert(col.name()) {
                return Err(invalid(format!("field `{}` declared twice", col.name())));
            }
            if col.header_text().trim().is_empty() {
                return Err(invalid(format!("field `{}` has an empty header", col.name())));
            }
            if !headers.insert(col.header_text().trim()) {
                return Err(invalid(format!("header `{}` used twice", col.header_text())));
            }
        }
        Ok(Self {
            collection: naming::collection_key(&name),
            title: naming::display_title(&name),
            name,
            columns,
        })
    }

    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Model type name, e.g. `ManufacturingPlant`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Repository key, e.g. `manufacturing_plants`.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Table title, e.g. `Manufacturing Plants`.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn width(&self) -> u32 {
        self.columns.len() as u32
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(ColumnSpec::header_text)
    }
}

pub struct SchemaBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
}

impl SchemaBuilder {
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> Result<Schema> {
        Schema::new(self.name, self.columns)
    }
}

/// Conversion from a parsed row into a model value.
pub trait FromRecord: Sized + Send + Sync + 'static {
    fn from_record(record: &Record) -> std::result::Result<Self, ModelError>;

    /// Hook run after a row is built. Rejecting aborts the load.
    fn validate(&self) -> std::result::Result<(), ModelError> {
        Ok(())
    }
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> std::result::Result<Self, ModelError> {
        Ok(record.clone())
    }
}

/// A record type bound to a worksheet table.
///
/// ```
/// use sheetbind::{ColumnSpec, FromRecord, Model, ModelError, Record};
///
/// struct Car {
///     make: String,
///     year: i64,
/// }
///
/// impl FromRecord for Car {
///     fn from_record(r: &Record) -> Result<Self, ModelError> {
///         Ok(Car { make: r.text("make")?.to_string(), year: r.int("year")? })
///     }
/// }
///
/// impl Model for Car {
///     const NAME: &'static str = "Car";
///     fn columns() -> Vec<ColumnSpec> {
///         vec![
///             ColumnSpec::text("make").header("Make"),
///             ColumnSpec::int("year").header("Year"),
///         ]
///     }
/// }
///
/// assert_eq!(Car::schema().unwrap().collection(), "cars");
/// ```
pub trait Model: FromRecord {
    const NAME: &'static str;

    fn columns() -> Vec<ColumnSpec>;

    fn schema() -> Result<Schema> {
        Schema::new(Self::NAME, Self::columns())
    }
}

type RepositoryFactory = fn() -> Box<dyn ErasedRepository>;

fn new_repository<M: FromRecord>() -> Box<dyn ErasedRepository> {
    Box::new(Repository::<M>::new())
}

/// A schema together with the record type its rows are built into.
#[derive(Clone)]
pub struct ModelEntry {
    schema: Arc<Schema>,
    factory: RepositoryFactory,
}

impl ModelEntry {
    pub fn of<M: Model>() -> Result<Self> {
        Ok(Self {
            schema: Arc::new(M::schema()?),
            factory: new_repository::<M>,
        })
    }

    /// Rows for this schema are kept as plain [`Record`]s.
    pub fn untyped(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
            factory: new_repository::<Record>,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn new_repository(&self) -> Box<dyn ErasedRepository> {
        (self.factory)()
    }
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("schema", &self.schema.name())
            .finish()
    }
}

/// Models addressable by name, used when sheets are described in config
/// files rather than in code.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: Vec<ModelEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Model>(&mut self) -> Result<&mut Self> {
        let entry = ModelEntry::of::<M>()?;
        self.insert(entry)?;
        Ok(self)
    }

    pub fn register_schema(&mut self, schema: Schema) -> Result<&mut Self> {
        self.insert(ModelEntry::untyped(schema))?;
        Ok(self)
    }

    fn insert(&mut self, entry: ModelEntry) -> Result<()> {
        if self.get(entry.schema().name()).is_some() {
            return Err(SheetBindError::Schema {
                model: entry.schema().name().to_string(),
                message: "already registered".to_string(),
            });
        }
        tracing::debug!(model = entry.schema().name(), "registered model");
        self.entries.push(entry);
        Ok(())
    }

    /// Look up by model name (`ManufacturingPlant`) or collection key
    /// (`manufacturing_plants`).
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries
            .iter()
            .find(|e| e.schema().name() == name || e.schema().collection() == name)
    }

    pub fn resolve(&self, name: &str) -> Result<ModelEntry> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SheetBindError::UnknownModel(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.schema().name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
