use crate::record::{Record, RecordId};
use pricewatch_shared::Store;

/// Authoritative record storage the catalog reloads from after deletions.
///
/// Calls are synchronous; the catalog owns its repository and serializes
/// access to it.
pub trait RecordRepository: Send {
    fn insert(&mut self, record: &Record) -> Result<(), RepositoryError>;

    /// Returns `false` when no record with `id` exists
    fn delete_by_id(&mut self, id: RecordId) -> Result<bool, RepositoryError>;

    /// Returns how many records were deleted
    fn delete_by_store(&mut self, store: Store) -> Result<usize, RepositoryError>;

    fn delete_all(&mut self) -> Result<(), RepositoryError>;

    /// Every stored record, ascending by id
    fn load_all(&self) -> Result<Vec<Record>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate record id: {0}")]
    DuplicateId(RecordId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Volatile repository, useful for tests and tooling
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: Vec<Record>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records (kept sorted by id)
    pub fn with_records(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.id());
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn insert(&mut self, record: &Record) -> Result<(), RepositoryError> {
        match self.records.binary_search_by_key(&record.id(), |r| r.id()) {
            Ok(_) => Err(RepositoryError::DuplicateId(record.id())),
            Err(pos) => {
                self.records.insert(pos, record.clone());
                Ok(())
            }
        }
    }

    fn delete_by_id(&mut self, id: RecordId) -> Result<bool, RepositoryError> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        Ok(self.records.len() < before)
    }

    fn delete_by_store(&mut self, store: Store) -> Result<usize, RepositoryError> {
        let before = self.records.len();
        self.records.retain(|r| r.store() != store);
        Ok(before - self.records.len())
    }

    fn delete_all(&mut self) -> Result<(), RepositoryError> {
        self.records.clear();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Record>, RepositoryError> {
        Ok(self.records.clone())
    }
}
