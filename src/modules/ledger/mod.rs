// Supplier ledger module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::SupplierBalance;
pub use services::SupplierLedgerService;
