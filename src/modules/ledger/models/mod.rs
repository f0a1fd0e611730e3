mod supplier_balance;

pub use supplier_balance::SupplierBalance;
