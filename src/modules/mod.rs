pub mod audit;
pub mod invoices;
pub mod ledger;
pub mod payments;
pub mod purchase_orders;
pub mod suppliers;
