//! Test helpers shared across dishboard crates.

pub mod fixtures;
pub mod sink;
pub mod store;

pub use fixtures::{create_body, sample_dish};
pub use sink::RecordingSink;
pub use store::FlakyStore;
