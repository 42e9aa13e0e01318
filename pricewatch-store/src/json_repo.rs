use chrono::{DateTime, Utc};
use pricewatch_catalog::{Record, RecordDraft, RecordId, RecordRepository, RepositoryError};
use pricewatch_shared::Store;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// On-disk row; derived fields are recomputed on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    title: String,
    #[serde(default)]
    price_original: String,
    price_sell: String,
    #[serde(default)]
    discount: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    url: String,
    store: Store,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price_value: f64,
    captured_at: DateTime<Utc>,
}

impl From<&Record> for StoredRecord {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id(),
            title: record.title().to_string(),
            price_original: record.price_original_text().to_string(),
            price_sell: record.price_display_text().to_string(),
            discount: record.discount_text().to_string(),
            image: record.image_ref().to_string(),
            url: record.source_url().to_string(),
            store: record.store(),
            rating: record.rating().map(str::to_string),
            description: record.description().map(str::to_string),
            price_value: record.price_value(),
            captured_at: record.captured_at(),
        }
    }
}

impl StoredRecord {
    fn to_record(&self) -> Record {
        let draft = RecordDraft {
            title: self.title.clone(),
            price_original_text: self.price_original.clone(),
            price_sell_text: self.price_sell.clone(),
            discount_text: self.discount.clone(),
            image_ref: self.image.clone(),
            source_url: self.url.clone(),
            store: self.store,
            rating: self.rating.clone(),
            description: self.description.clone(),
        };
        Record::restore(self.id, draft, self.captured_at)
    }
}

/// Repository backed by a single JSON array file.
///
/// The whole file is rewritten after every mutation, through a temporary
/// file and a rename. In-memory rows only change once the write succeeded.
pub struct JsonFileRepository {
    path: PathBuf,
    rows: Vec<StoredRecord>,
}

impl JsonFileRepository {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let mut rows: Vec<StoredRecord> = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        rows.sort_by_key(|row| row.id);

        info!(path = %path.display(), records = rows.len(), "Opened catalog file");
        Ok(Self { path, rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn commit(&mut self, rows: Vec<StoredRecord>) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&rows)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e.into());
        }

        debug!(path = %self.path.display(), records = rows.len(), "Catalog file written");
        self.rows = rows;
        Ok(())
    }
}

impl RecordRepository for JsonFileRepository {
    fn insert(&mut self, record: &Record) -> Result<(), RepositoryError> {
        let pos = match self.rows.binary_search_by_key(&record.id(), |row| row.id) {
            Ok(_) => return Err(RepositoryError::DuplicateId(record.id())),
            Err(pos) => pos,
        };

        let mut rows = self.rows.clone();
        rows.insert(pos, StoredRecord::from(record));
        self.commit(rows)
    }

    fn delete_by_id(&mut self, id: RecordId) -> Result<bool, RepositoryError> {
        let Ok(pos) = self.rows.binary_search_by_key(&id, |row| row.id) else {
            return Ok(false);
        };

        let mut rows = self.rows.clone();
        rows.remove(pos);
        self.commit(rows)?;
        Ok(true)
    }

    fn delete_by_store(&mut self, store: Store) -> Result<usize, RepositoryError> {
        let rows: Vec<StoredRecord> = self
            .rows
            .iter()
            .filter(|row| row.store != store)
            .cloned()
            .collect();
        let removed = self.rows.len() - rows.len();
        if removed > 0 {
            self.commit(rows)?;
        }
        Ok(removed)
    }

    fn delete_all(&mut self) -> Result<(), RepositoryError> {
        self.commit(Vec::new())
    }

    fn load_all(&self) -> Result<Vec<Record>, RepositoryError> {
        Ok(self.rows.iter().map(StoredRecord::to_record).collect())
    }
}
