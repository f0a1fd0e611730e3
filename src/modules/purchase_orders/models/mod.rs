mod line_item;
mod purchase_order;
mod status;

pub use line_item::{LineItemPricingUpdate, OrderLineItem};
pub use purchase_order::{NewPurchaseOrder, PurchaseOrder, PurchaseOrderUpdate};
pub use status::OrderStatus;
