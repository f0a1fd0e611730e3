// Store-assigned identifiers (AUTO_INCREMENT keys)

pub type OrderId = i64;
pub type ItemId = i64;
pub type InvoiceId = i64;
pub type PaymentId = i64;
pub type SupplierId = i64;
pub type ProductId = i64;
pub type UserId = i64;
