mod purchase_order_service;

pub use purchase_order_service::PurchaseOrderService;
