// Test helpers shared by the unit and integration test crates.
//
// Usage (from tests/<kind>/<name>.rs):
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//
// Service-level tests run against `MemoryStore`; MySQL-backed tests read
// TEST_DATABASE_URL and are `#[ignore]`d by default.

#![allow(dead_code)]

pub mod test_data;
pub mod test_database;

pub use test_data::*;
pub use test_database::*;
