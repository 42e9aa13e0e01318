pub mod listing;
pub mod store;
