use crate::error::ModelError;
use crate::record::Record;
use crate::schema::FromRecord;
use std::any::Any;

/// Rows loaded from one table: the typed values and the records they were
/// built from, in sheet order.
#[derive(Debug, Clone)]
pub struct Repository<M> {
    items: Vec<M>,
    records: Vec<Record>,
}

impl<M> Default for Repository<M> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<M: FromRecord> Repository<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model from `record`, run its validation hook and store both.
    pub fn push(&mut self, record: Record) -> Result<(), ModelError> {
        let item = M::from_record(&record)?;
        item.validate()?;
        self.items.push(item);
        self.records.push(record);
        Ok(())
    }
}

impl<M> Repository<M> {
    pub fn all(&self) -> &[M] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&M> {
        self.items.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<M> {
        self.items
    }
}

impl<'a, M> IntoIterator for &'a Repository<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Object-safe view of a `Repository<M>` so repositories of different model
/// types can live side by side.
pub(crate) trait ErasedRepository: Send + Sync {
    fn push_record(&mut self, record: Record) -> Result<(), ModelError>;
    fn records(&self) -> &[Record];
    fn as_any(&self) -> &dyn Any;
}

impl<M: FromRecord> ErasedRepository for Repository<M> {
    fn push_record(&mut self, record: Record) -> Result<(), ModelError> {
        self.push(record)
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Repositories for every table of a workbook, keyed by collection.
#[derive(Default)]
pub struct Repositories {
    entries: Vec<(String, Box<dyn ErasedRepository>)>,
}

impl Repositories {
    pub(crate) fn insert(&mut self, collection: &str, repo: Box<dyn ErasedRepository>) {
        match self.entries.iter_mut().find(|(k, _)| k == collection) {
            Some(slot) => slot.1 = repo,
            None => self.entries.push((collection.to_string(), repo)),
        }
    }

    pub(crate) fn get_mut(&mut self, collection: &str) -> Option<&mut Box<dyn ErasedRepository>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == collection)
            .map(|(_, r)| r)
    }

    /// First repository holding `M` values.
    pub fn get<M: FromRecord>(&self) -> Option<&Repository<M>> {
        self.entries
            .iter()
            .find_map(|(_, r)| r.as_any().downcast_ref::<Repository<M>>())
    }

    /// Repository for `collection`, if it holds `M` values.
    pub fn get_named<M: FromRecord>(&self, collection: &str) -> Option<&Repository<M>> {
        self.entries
            .iter()
            .find(|(k, _)| k == collection)
            .and_then(|(_, r)| r.as_any().downcast_ref::<Repository<M>>())
    }

    /// Raw records of any collection, whatever its model type.
    pub fn records(&self, collection: &str) -> Option<&[Record]> {
        self.entries
            .iter()
            .find(|(k, _)| k == collection)
            .map(|(_, r)| r.records())
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, r)| (k, r.records().len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Plant {
        name: String,
    }

    impl FromRecord for Plant {
        fn from_record(r: &Record) -> Result<Self, ModelError> {
            Ok(Plant {
                name: r.text("name")?.to_string(),
            })
        }

        fn validate(&self) -> Result<(), ModelError> {
            if self.name.starts_with('#') {
                return Err(ModelError::invalid("placeholder name"));
            }
            Ok(())
        }
    }

    #[test]
    fn push_runs_validation_hook() {
        let mut repo = Repository::<Plant>::new();
        repo.push(Record::new().with("name", "Plant A")).unwrap();
        let err = repo.push(Record::new().with("name", "#tbd")).unwrap_err();
        assert_eq!(err, ModelError::Invalid("placeholder name".into()));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.records().len(), 1);
    }

    #[test]
    fn typed_and_untyped_lookup() {
        let mut repos = Repositories::default();
        repos.insert("plants", Box::new(Repository::<Plant>::new()));
        repos.insert("cars", Box::new(Repository::<Record>::new()));
        repos
            .get_mut("cars")
            .unwrap()
            .push_record(Record::new().with("make", "Ford"))
            .unwrap();

        assert!(repos.get::<Plant>().is_some_and(Repository::is_empty));
        assert!(repos.get_named::<Plant>("cars").is_none());
        assert_eq!(repos.get_named::<Record>("cars").unwrap().len(), 1);
        assert_eq!(repos.records("cars").unwrap()[0].text("make").unwrap(), "Ford");
        assert_eq!(repos.collections().collect::<Vec<_>>(), ["plants", "cars"]);
    }
}
