mod supplier_ledger_service;

pub use supplier_ledger_service::SupplierLedgerService;
