pub mod harness;
pub mod mock;

pub use harness::{run_size, Measurement, CSV_HEADER};
pub use mock::generate_records;
