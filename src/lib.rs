//! Procurement core library
//!
//! Supplier directory, purchase order lifecycle and item accounting, supplier
//! invoices, the payments ledger, per-supplier balances and an audit trail
//! over a transactional store.

pub mod config;
pub mod core;
pub mod modules;
pub mod store;

// Re-export commonly used types
pub use crate::core::{AppError, Result};
pub use crate::modules::audit;
pub use crate::modules::invoices;
pub use crate::modules::ledger;
pub use crate::modules::payments;
pub use crate::modules::purchase_orders;
pub use crate::modules::suppliers;
pub use crate::store::{MemoryStore, MySqlStore};
