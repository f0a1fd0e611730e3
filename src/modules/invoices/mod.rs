// Invoices module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Invoice, InvoiceStatus, InvoiceWithBalance, NewInvoice};
pub use services::InvoiceService;
