pub mod record;
pub mod alpha;
pub mod price;
pub mod cheapest;
pub mod repository;
pub mod catalog;

pub use record::{IdAllocator, Record, RecordDraft, RecordError, RecordId, SharedRecord};
pub use alpha::AlphaIndex;
pub use price::PriceIndex;
pub use cheapest::CheapestIndex;
pub use repository::{InMemoryRecordRepository, RecordRepository, RepositoryError};
pub use catalog::{Catalog, CatalogError, IndexSizes};
pub use pricewatch_shared::{normalize, Store};
