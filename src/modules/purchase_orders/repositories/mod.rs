mod line_item_repository;
mod purchase_order_repository;

pub use line_item_repository::LineItemRepository;
pub use purchase_order_repository::PurchaseOrderRepository;
