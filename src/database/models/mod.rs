pub mod audit_log;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod payment_method;
pub mod product;
pub mod tenant;
pub mod user;

pub use audit_log::{AuditLog, NewAuditLog};
pub use order::Order;
pub use order_item::OrderItem;
pub use payment::Payment;
pub use payment_method::PaymentMethod;
pub use product::Product;
pub use tenant::Tenant;
pub use user::User;
