// Storage backends implementing `Store`

pub mod memory;
pub mod mysql;

pub use memory::{MemoryStore, MemoryUnitOfWork};
pub use mysql::{MySqlStore, MySqlUnitOfWork};
