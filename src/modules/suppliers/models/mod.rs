mod supplier;

pub use supplier::{NewSupplier, Supplier, SupplierStatus};
