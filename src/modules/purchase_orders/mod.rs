// Purchase orders module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    LineItemPricingUpdate, NewPurchaseOrder, OrderLineItem, OrderStatus, PurchaseOrder,
    PurchaseOrderUpdate,
};
pub use services::PurchaseOrderService;
