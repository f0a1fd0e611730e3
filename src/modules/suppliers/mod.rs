// Suppliers module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{NewSupplier, Supplier, SupplierStatus};
pub use services::SupplierService;
