//! Catalog coordinator.
//!
//! Keeps the canonical record list (insertion order) and three derived
//! indexes in step. There is no incremental delete: every removal goes
//! through the repository, reloads the full list, and rebuilds all indexes
//! from scratch in O(n log n).
//!
//! The catalog does no locking. Callers sharing one instance across threads
//! wrap the whole catalog in a mutex so a rebuild never interleaves with a
//! query.

use crate::alpha::{AlphaIndex, Inorder};
use crate::cheapest::CheapestIndex;
use crate::price::PriceIndex;
use crate::record::{IdAllocator, Record, RecordDraft, RecordError, RecordId, SharedRecord};
use crate::repository::{RecordRepository, RepositoryError};
use pricewatch_shared::{normalize, ListingPayload, Store};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry counts per structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexSizes {
    pub records: usize,
    pub alphabetical: usize,
    pub by_price: usize,
    pub cheapest: usize,
}

pub struct Catalog<R: RecordRepository> {
    repository: R,
    records: Vec<SharedRecord>,
    alpha: AlphaIndex,
    price: PriceIndex,
    cheapest: CheapestIndex,
    ids: IdAllocator,
}

impl<R: RecordRepository> Catalog<R> {
    /// Hydrate from everything the repository holds. New ids continue
    /// past the largest id already persisted.
    pub fn open(repository: R) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            repository,
            records: Vec::new(),
            alpha: AlphaIndex::new(),
            price: PriceIndex::new(),
            cheapest: CheapestIndex::new(),
            ids: IdAllocator::new(),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Assign an id to a draft, then add it
    pub fn ingest(&mut self, draft: RecordDraft) -> Result<SharedRecord, CatalogError> {
        let id = self.ids.peek_next().ok_or(RecordError::IdsExhausted)?;
        let record = Record::new(id, draft);
        self.add_record(record)
    }

    /// Validate a scraper payload and ingest it
    pub fn ingest_listing(
        &mut self,
        payload: ListingPayload,
    ) -> Result<SharedRecord, CatalogError> {
        let draft = RecordDraft::try_from(payload)?;
        self.ingest(draft)
    }

    /// Persist the record, append it to the canonical list and insert it
    /// into every index. Nothing changes in memory if persisting fails.
    pub fn add_record(&mut self, record: Record) -> Result<SharedRecord, CatalogError> {
        self.repository.insert(&record)?;
        self.ids.observe(record.id());

        let record = Arc::new(record);
        self.records.push(record.clone());

        if !self.alpha.insert(record.clone()) {
            debug!(
                record_id = record.id().0,
                key = record.normalized_title(),
                "Title already indexed, record kept out of the alphabetical index"
            );
        }
        self.price.insert(record.clone());
        self.cheapest.insert(record.clone());

        debug!(record_id = record.id().0, store = %record.store(), "Record added");
        Ok(record)
    }

    /// Delete one record from the repository and rebuild from what remains.
    /// Returns `false` when the repository had no such record.
    pub fn remove_by_id(&mut self, id: RecordId) -> Result<bool, CatalogError> {
        if !self.repository.delete_by_id(id)? {
            debug!(record_id = id.0, "Nothing to remove");
            return Ok(false);
        }

        self.reload()?;
        Ok(true)
    }

    /// Delete every record from `store` and rebuild; returns how many went
    pub fn remove_by_store(&mut self, store: Store) -> Result<usize, CatalogError> {
        let removed = self.repository.delete_by_store(store)?;
        if removed > 0 {
            info!(%store, removed, "Removed store records");
            self.reload()?;
        }
        Ok(removed)
    }

    /// Empty the repository, the canonical list and every index
    pub fn clear(&mut self) -> Result<(), CatalogError> {
        self.repository.delete_all()?;
        self.records.clear();
        self.alpha = AlphaIndex::new();
        self.price = PriceIndex::new();
        self.cheapest = CheapestIndex::new();
        info!("Catalog cleared");
        Ok(())
    }

    /// Replace the canonical list and rebuild all three indexes from it.
    /// The repository is not touched.
    pub fn rebuild_from_list<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<SharedRecord> = records.into_iter().map(Arc::new).collect();
        for record in &records {
            self.ids.observe(record.id());
        }

        let alpha = AlphaIndex::from_records(records.iter().cloned());
        let price = PriceIndex::from_records(records.iter().cloned());
        let cheapest = CheapestIndex::build_from_collection(records.iter().cloned());

        self.records = records;
        self.alpha = alpha;
        self.price = price;
        self.cheapest = cheapest;

        info!(
            records = self.records.len(),
            alphabetical = self.alpha.len(),
            "Indexes rebuilt"
        );
    }

    fn reload(&mut self) -> Result<(), CatalogError> {
        let records = self.repository.load_all()?;
        self.rebuild_from_list(records);
        Ok(())
    }

    /// Canonical list in insertion order
    pub fn records(&self) -> &[SharedRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&SharedRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn records_by_store(&self, store: Store) -> Vec<SharedRecord> {
        self.records.iter().filter(|r| r.store() == store).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn index_sizes(&self) -> IndexSizes {
        IndexSizes {
            records: self.records.len(),
            alphabetical: self.alpha.len(),
            by_price: self.price.len(),
            cheapest: self.cheapest.len(),
        }
    }

    pub fn lookup_exact(&self, title: &str) -> Option<SharedRecord> {
        self.alpha.lookup_exact(title)
    }

    pub fn search_contains(&self, term: &str) -> Vec<SharedRecord> {
        self.alpha.search_contains(term)
    }

    pub fn alphabetical(&self) -> Inorder<'_> {
        self.alpha.inorder()
    }

    pub fn range_query(&self, min: f64, max: f64) -> Vec<SharedRecord> {
        self.price.range_query(min, max)
    }

    pub fn sorted_by_price(&self) -> Vec<SharedRecord> {
        self.price.sorted_by_price()
    }

    pub fn cheapest(&self, n: usize) -> Vec<SharedRecord> {
        self.cheapest.top_n(n)
    }

    pub fn peek_cheapest(&self) -> Option<&SharedRecord> {
        self.cheapest.peek()
    }

    /// The `n` cheapest records whose title contains `term`
    pub fn cheapest_matching(&self, term: &str, n: usize) -> Vec<SharedRecord> {
        CheapestIndex::build_from_collection(self.matching(term)).top_n(n)
    }

    /// Records priced within `[min, max]` whose title contains `term`
    pub fn range_matching(&self, term: &str, min: f64, max: f64) -> Vec<SharedRecord> {
        PriceIndex::from_records(self.matching(term)).range_query(min, max)
    }

    /// Substring matches, or the whole canonical list for a blank term
    fn matching(&self, term: &str) -> Vec<SharedRecord> {
        if normalize(term).is_empty() {
            self.records.clone()
        } else {
            self.alpha.search_contains(term)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRecordRepository;

    fn draft(title: &str, price: &str, store: Store) -> RecordDraft {
        RecordDraft::new(title, price, store)
    }

    fn catalog() -> Catalog<InMemoryRecordRepository> {
        Catalog::open(InMemoryRecordRepository::new()).unwrap()
    }

    fn prices(records: &[SharedRecord]) -> Vec<f64> {
        records.iter().map(|r| r.price_value()).collect()
    }

    struct BrokenRepository;

    impl RecordRepository for BrokenRepository {
        fn insert(&mut self, _record: &Record) -> Result<(), RepositoryError> {
            Err(RepositoryError::Backend("disk full".to_string()))
        }
        fn delete_by_id(&mut self, _id: RecordId) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Backend("offline".to_string()))
        }
        fn delete_by_store(&mut self, _store: Store) -> Result<usize, RepositoryError> {
            Err(RepositoryError::Backend("offline".to_string()))
        }
        fn delete_all(&mut self) -> Result<(), RepositoryError> {
            Ok(())
        }
        fn load_all(&self) -> Result<Vec<Record>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_ingest_assigns_sequential_ids() {
        let mut catalog = catalog();
        let a = catalog.ingest(draft("Mouse", "$ 20.000", Store::Alkosto)).unwrap();
        let b = catalog.ingest(draft("Teclado", "$ 80.000", Store::Alkosto)).unwrap();

        assert_eq!(a.id(), RecordId(0));
        assert_eq!(b.id(), RecordId(1));
        assert_eq!(catalog.repository().len(), 2);
        assert_eq!(catalog.get(RecordId(1)).unwrap().title(), "Teclado");
    }

    #[test]
    fn test_duplicate_titles_only_dropped_from_alpha() {
        let mut catalog = catalog();
        catalog.ingest(draft("Red Chair", "$ 100", Store::Alkosto)).unwrap();
        catalog.ingest(draft("red  chair", "$ 90", Store::MercadoLibre)).unwrap();

        assert_eq!(
            catalog.index_sizes(),
            IndexSizes {
                records: 2,
                alphabetical: 1,
                by_price: 2,
                cheapest: 2,
            }
        );
        assert_eq!(catalog.lookup_exact("Red Chair").unwrap().id(), RecordId(0));
        // a blank term falls back to the canonical list, duplicates included
        assert_eq!(catalog.cheapest_matching("", 5).len(), 2);
        assert_eq!(catalog.cheapest_matching("chair", 5).len(), 1);
    }

    #[test]
    fn test_remove_by_id_rebuilds() {
        let mut catalog = catalog();
        for (title, price) in [("A", "$ 30"), ("B", "$ 10"), ("C", "$ 20")] {
            catalog.ingest(draft(title, price, Store::Alkosto)).unwrap();
        }

        assert!(catalog.remove_by_id(RecordId(1)).unwrap());
        assert!(!catalog.remove_by_id(RecordId(1)).unwrap());
        assert!(!catalog.remove_by_id(RecordId(99)).unwrap());

        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup_exact("b").is_none());
        assert_eq!(prices(&catalog.sorted_by_price()), vec![20.0, 30.0]);
        assert_eq!(catalog.peek_cheapest().unwrap().price_value(), 20.0);

        // ids are never reused after a rebuild
        let next = catalog.ingest(draft("D", "$ 5", Store::Alkosto)).unwrap();
        assert_eq!(next.id(), RecordId(3));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut catalog = catalog();
        catalog.ingest(draft("A", "$ 1", Store::Alkosto)).unwrap();
        catalog.clear().unwrap();

        assert!(catalog.is_empty());
        assert!(catalog.repository().is_empty());
        assert_eq!(
            catalog.index_sizes(),
            IndexSizes {
                records: 0,
                alphabetical: 0,
                by_price: 0,
                cheapest: 0,
            }
        );
        assert!(catalog.cheapest(3).is_empty());
    }

    #[test]
    fn test_open_hydrates_from_repository() {
        let seeded = vec![
            Record::new(RecordId(10), draft("Tablet", "$ 500.000", Store::MercadoLibre)),
            Record::new(RecordId(4), draft("Celular", "$ 900.000", Store::Alkosto)),
        ];
        let mut catalog = Catalog::open(InMemoryRecordRepository::with_records(seeded)).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].id(), RecordId(4));
        assert_eq!(catalog.lookup_exact("tablet").unwrap().id(), RecordId(10));

        let fresh = catalog.ingest(draft("Cable", "$ 9.000", Store::Alkosto)).unwrap();
        assert_eq!(fresh.id(), RecordId(11));
    }

    #[test]
    fn test_failed_persist_leaves_catalog_untouched() {
        let mut catalog = Catalog::open(BrokenRepository).unwrap();
        let err = catalog.ingest(draft("A", "$ 1", Store::Alkosto)).unwrap_err();

        assert!(matches!(err, CatalogError::Repository(RepositoryError::Backend(_))));
        assert!(catalog.is_empty());
        assert!(catalog.peek_cheapest().is_none());
        assert!(catalog.remove_by_id(RecordId(0)).is_err());
    }

    #[test]
    fn test_ingest_listing_rejects_incomplete() {
        let mut catalog = catalog();
        let err = catalog.ingest_listing(ListingPayload::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Record(RecordError::IncompleteListing(_))));

        let payload: ListingPayload = serde_json::from_str(
            r#"{"title": "Cámara", "price_sell": "$ 250.000",
                "url": "https://www.mercadolibre.com.co/x"}"#,
        )
        .unwrap();
        let record = catalog.ingest_listing(payload).unwrap();
        assert_eq!(record.store(), Store::MercadoLibre);
        assert_eq!(catalog.search_contains("camara").len(), 1);
    }

    #[test]
    fn test_range_matching_filters_by_term() {
        let mut catalog = catalog();
        catalog.ingest(draft("Laptop Gamer", "$ 3.000.000", Store::Alkosto)).unwrap();
        catalog.ingest(draft("Laptop Oficina", "$ 1.500.000", Store::Alkosto)).unwrap();
        catalog.ingest(draft("Mouse Gamer", "$ 150.000", Store::Alkosto)).unwrap();

        let hits = catalog.range_matching("gamer", 100_000.0, 2_000_000.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title(), "Mouse Gamer");

        assert_eq!(
            prices(&catalog.range_matching("", 0.0, 2_000_000.0)),
            vec![150_000.0, 1_500_000.0]
        );
        assert!(catalog.range_matching("tablet", 0.0, 1e9).is_empty());
    }

    #[test]
    fn test_cheapest_matching_orders_and_caps() {
        let mut catalog = catalog();
        for (title, price) in [
            ("Laptop A", "$ 300"),
            ("Laptop B", "$ 100"),
            ("Mouse", "$ 50"),
            ("Laptop C", "$ 200"),
        ] {
            catalog.ingest(draft(title, price, Store::Alkosto)).unwrap();
        }

        let top = catalog.cheapest_matching("laptop", 2);
        assert_eq!(prices(&top), vec![100.0, 200.0]);
        assert_eq!(top[0].title(), "Laptop B");

        // n larger than the match count returns every match, cheapest first
        assert_eq!(
            prices(&catalog.cheapest_matching("LAPTOP", 10)),
            vec![100.0, 200.0, 300.0]
        );
        assert!(catalog.cheapest_matching("laptop", 0).is_empty());
        assert_eq!(prices(&catalog.cheapest_matching("", 1)), vec![50.0]);
        // the catalog's own heap is untouched
        assert_eq!(catalog.peek_cheapest().unwrap().price_value(), 50.0);
    }

    #[test]
    fn test_open_continues_ids_past_persisted_records() {
        let seeded = vec![Record::new(RecordId(0), draft("Tablet", "$ 500.000", Store::Alkosto))];
        let mut catalog = Catalog::open(InMemoryRecordRepository::with_records(seeded)).unwrap();

        for expected in 1..=4 {
            let record = catalog.ingest(draft("Cable", "$ 9.000", Store::Alkosto)).unwrap();
            assert_eq!(record.id(), RecordId(expected));
        }
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.repository().len(), 5);
    }

    #[test]
    fn test_open_with_max_id_refuses_new_ids() {
        let seeded = vec![Record::new(RecordId(u64::MAX), draft("Monitor", "$ 1", Store::Alkosto))];
        let mut catalog = Catalog::open(InMemoryRecordRepository::with_records(seeded)).unwrap();
        assert_eq!(catalog.len(), 1);

        let err = catalog.ingest(draft("Cable", "$ 2", Store::Alkosto)).unwrap_err();
        assert!(matches!(err, CatalogError::Record(RecordError::IdsExhausted)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.repository().len(), 1);
    }
}
