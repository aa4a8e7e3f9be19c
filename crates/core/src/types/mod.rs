//! Shared domain types.

pub mod category;
pub mod email;
pub mod id;
pub mod status;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::{CartId, OrderId, ProductId, UserId};
pub use status::{InvalidTransition, OrderStatus, PaymentMethod};
