use crate::config::{DiscoveryPolicy, LoadOptions};
use crate::error::{CellLocation, Result, SheetBindError};
use crate::layout::compute_layouts;
use crate::locator::find_table;
use crate::parser::parse_table;
use crate::record::Record;
use crate::repository::{Repositories, Repository};
use crate::schema::FromRecord;
use crate::sheet::SheetSpec;
use crate::template::{backend_name, write_sheet_template, write_table_rows};
use sheetbind_io::{SpreadsheetReader, SpreadsheetWriter};
use std::collections::HashSet;
use std::path::Path;

/// Sheet umya creates in every new workbook.
const DEFAULT_SHEET: &str = "Sheet1";

#[derive(Debug, Clone, Copy)]
enum Contents {
    Template,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Xlsx,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Xlsx,
        }
    }
}

fn read_err<R: SpreadsheetReader>(err: R::Error) -> SheetBindError {
    SheetBindError::io(backend_name::<R>(), err)
}

fn write_err<W: SpreadsheetWriter>(err: W::Error) -> SheetBindError {
    SheetBindError::io(backend_name::<W>(), err)
}

/// A workbook description: the sheets, their tables and the repositories
/// filled by the most recent load.
#[derive(Debug)]
pub struct ExcelFile {
    sheets: Vec<SheetSpec>,
    options: LoadOptions,
    repositories: Repositories,
}

impl ExcelFile {
    /// Rejects duplicate sheet names and collections declared twice.
    pub fn new(sheets: Vec<SheetSpec>) -> Result<Self> {
        if sheets.is_empty() {
            return Err(SheetBindError::Config("no sheets declared".to_string()));
        }
        let mut names = HashSet::new();
        let mut collections = HashSet::new();
        for spec in &sheets {
            if !names.insert(spec.name()) {
                return Err(SheetBindError::Layout {
                    sheet: spec.name().to_string(),
                    message: "sheet declared twice".to_string(),
                });
            }
            for schema in spec.schemas() {
                if !collections.insert(schema.collection()) {
                    return Err(SheetBindError::DuplicateCollection {
                        collection: schema.collection().to_string(),
                    });
                }
            }
            // fail on layout overflow now rather than at generate time
            compute_layouts(spec)?;
        }
        let repositories = empty_repositories(&sheets);
        Ok(Self {
            sheets,
            options: LoadOptions::default(),
            repositories,
        })
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    pub fn sheets(&self) -> &[SheetSpec] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Write titles and headers for every sheet, in declaration order.
    pub fn write_template<W: SpreadsheetWriter>(&self, writer: &mut W) -> Result<()> {
        for spec in &self.sheets {
            write_sheet_template(writer, spec)?;
        }
        Ok(())
    }

    /// Template plus the rows currently held in the repositories.
    pub fn write_data<W: SpreadsheetWriter>(&self, writer: &mut W) -> Result<()> {
        for spec in &self.sheets {
            let layouts = write_sheet_template(writer, spec)?;
            for (layout, schema) in layouts.iter().zip(spec.schemas()) {
                let records = self.repositories.records(&layout.collection).unwrap_or(&[]);
                tracing::debug!(
                    sheet = spec.name(),
                    collection = %layout.collection,
                    rows = records.len(),
                    "writing rows"
                );
                write_table_rows(writer, spec.name(), layout, schema, records)?;
            }
        }
        Ok(())
    }

    /// Create a blank template at `path`. `.json` paths get a JSON workbook,
    /// anything else an xlsx file.
    pub fn generate_template(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _span = tracing::info_span!("generate_template", path = %path.display()).entered();
        self.save(path, Contents::Template)
    }

    /// Write the template and every loaded row to `path`.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _span = tracing::info_span!("export", path = %path.display()).entered();
        self.save(path, Contents::Data)
    }

    fn fill<W: SpreadsheetWriter>(&self, writer: &mut W, contents: Contents) -> Result<()> {
        match contents {
            Contents::Template => self.write_template(writer),
            Contents::Data => self.write_data(writer),
        }
    }

    fn save(&self, path: &Path, contents: Contents) -> Result<()> {
        match Format::for_path(path) {
            #[cfg(feature = "json")]
            Format::Json => {
                use sheetbind_io::JsonAdapter;

                let mut writer = JsonAdapter::new();
                self.fill(&mut writer, contents)?;
                writer.save_as_path(path).map_err(write_err::<JsonAdapter>)?;
            }
            #[cfg(feature = "umya")]
            Format::Xlsx => {
                use sheetbind_io::UmyaAdapter;

                let mut writer = UmyaAdapter::new();
                // The default sheet sits at index 0. Drop it once the first
                // declared sheet exists so a later `Sheet1` lands in order.
                let first = self.sheets.first().map(SheetSpec::name);
                if let Some(first) = first.filter(|name| *name != DEFAULT_SHEET) {
                    writer.create_sheet(first).map_err(write_err::<UmyaAdapter>)?;
                    writer
                        .delete_sheet(DEFAULT_SHEET)
                        .map_err(write_err::<UmyaAdapter>)?;
                }
                self.fill(&mut writer, contents)?;
                writer.save_as_path(path).map_err(write_err::<UmyaAdapter>)?;
            }
            #[allow(unreachable_patterns)]
            _ => return Err(unsupported(path)),
        }
        tracing::info!(path = %path.display(), sheets = self.sheets.len(), "workbook saved");
        Ok(())
    }

    /// Parse every declared table from the workbook at `path`.
    pub fn load_data(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _span = tracing::info_span!("load_data", path = %path.display()).entered();
        match Format::for_path(path) {
            #[cfg(feature = "json")]
            Format::Json => {
                let mut reader = sheetbind_io::JsonAdapter::open_path(path)
                    .map_err(read_err::<sheetbind_io::JsonAdapter>)?;
                self.load_from(&mut reader)
            }
            #[cfg(feature = "umya")]
            Format::Xlsx => {
                let mut reader = sheetbind_io::UmyaAdapter::open_path(path)
                    .map_err(read_err::<sheetbind_io::UmyaAdapter>)?;
                self.load_from(&mut reader)
            }
            #[cfg(all(feature = "calamine", not(feature = "umya")))]
            Format::Xlsx => {
                let mut reader = sheetbind_io::CalamineAdapter::open_path(path)
                    .map_err(read_err::<sheetbind_io::CalamineAdapter>)?;
                self.load_from(&mut reader)
            }
            #[allow(unreachable_patterns)]
            _ => Err(unsupported(path)),
        }
    }

    /// Parse every declared table through `reader`.
    ///
    /// Repositories are rebuilt from scratch. If any row fails, the error is
    /// returned and every repository is left empty.
    pub fn load_from<R: SpreadsheetReader>(&mut self, reader: &mut R) -> Result<()> {
        match self.read_all(reader) {
            Ok(repositories) => {
                self.repositories = repositories;
                Ok(())
            }
            Err(err) => {
                self.repositories = empty_repositories(&self.sheets);
                Err(err)
            }
        }
    }

    fn read_all<R: SpreadsheetReader>(&self, reader: &mut R) -> Result<Repositories> {
        let mut repositories = Repositories::default();

        for spec in &self.sheets {
            let sheet = spec.name();
            let _span = tracing::info_span!("load_sheet", sheet).entered();
            if !reader.has_sheet(sheet).map_err(read_err::<R>)? {
                return Err(SheetBindError::MissingSheet {
                    sheet: sheet.to_string(),
                });
            }
            let data = reader.read_sheet(sheet).map_err(read_err::<R>)?;

            for entry in spec.models() {
                let schema = entry.schema();
                let mut repo = entry.new_repository();
                let Some(start_col) = find_table(&data, spec.header_row(), schema) else {
                    let headers = schema.headers().collect::<Vec<_>>().join(", ");
                    match self.options.on_missing_table {
                        DiscoveryPolicy::Abort => {
                            return Err(SheetBindError::TableNotFound {
                                sheet: sheet.to_string(),
                                model: schema.name().to_string(),
                                row: spec.header_row(),
                                headers,
                            });
                        }
                        DiscoveryPolicy::Skip => {
                            tracing::warn!(
                                sheet,
                                model = schema.name(),
                                headers = %headers,
                                "table not found, leaving repository empty"
                            );
                            repositories.insert(schema.collection(), repo);
                            continue;
                        }
                    }
                };
                tracing::debug!(sheet, model = schema.name(), start_col, "table located");

                let summary = parse_table(
                    sheet,
                    &data,
                    schema,
                    start_col,
                    spec.data_start_row(),
                    |row, record| {
                        repo.push_record(record)
                            .map_err(|e| SheetBindError::Validation {
                                location: CellLocation::row(sheet, row),
                                model: schema.name().to_string(),
                                message: e.to_string(),
                            })
                    },
                )?;
                tracing::debug!(
                    sheet,
                    collection = schema.collection(),
                    rows = summary.rows,
                    excluded = summary.excluded,
                    "table parsed"
                );
                repositories.insert(schema.collection(), repo);
            }
        }
        Ok(repositories)
    }

    /// Repository of the first table whose rows are `M`.
    pub fn repository<M: FromRecord>(&self) -> Option<&Repository<M>> {
        self.repositories.get::<M>()
    }

    /// Repository for `collection`, if it holds `M` values.
    pub fn repository_named<M: FromRecord>(&self, collection: &str) -> Option<&Repository<M>> {
        self.repositories.get_named::<M>(collection)
    }

    /// Records of `collection`, typed or not.
    pub fn records(&self, collection: &str) -> Option<&[Record]> {
        self.repositories.records(collection)
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    /// Replace the rows of `collection`, e.g. before [`export`](Self::export).
    /// Each record goes through the model's conversion and validation hook;
    /// failures name the row the record would be written to.
    pub fn set_records(&mut self, collection: &str, records: Vec<Record>) -> Result<()> {
        let (spec, entry) = self
            .sheets
            .iter()
            .flat_map(|spec| spec.models().iter().map(move |entry| (spec, entry)))
            .find(|(_, entry)| entry.schema().collection() == collection)
            .ok_or_else(|| SheetBindError::UnknownModel(collection.to_string()))?;
        let mut repo = entry.new_repository();
        for (row, record) in (spec.data_start_row()..).zip(records) {
            repo.push_record(record)
                .map_err(|e| SheetBindError::Validation {
                    location: CellLocation::row(spec.name(), row),
                    model: entry.schema().name().to_string(),
                    message: e.to_string(),
                })?;
        }
        self.repositories.insert(collection, repo);
        Ok(())
    }
}

fn empty_repositories(sheets: &[SheetSpec]) -> Repositories {
    let mut repositories = Repositories::default();
    for entry in sheets.iter().flat_map(|s| s.models()) {
        repositories.insert(entry.schema().collection(), entry.new_repository());
    }
    repositories
}

#[allow(dead_code)]
fn unsupported(path: &Path) -> SheetBindError {
    SheetBindError::Config(format!(
        "no backend compiled in for `{}`",
        path.display()
    ))
}
