pub mod models;
pub mod text;

pub use models::listing::ListingPayload;
pub use models::store::{Store, StoreParseError};
pub use text::{normalize, parse_price};
