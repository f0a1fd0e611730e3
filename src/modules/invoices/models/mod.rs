mod invoice;

pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus, InvoiceWithBalance, NewInvoice};
