mod supplier_repository;

pub use supplier_repository::SupplierRepository;
