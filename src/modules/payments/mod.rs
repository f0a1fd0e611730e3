// Payments module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{NewPayment, Payment, PaymentMethod};
pub use services::PaymentService;
