//! Domain types for the API.
//!
//! These are validated domain objects, separate from the raw row types the
//! repositories map out of `PostgreSQL`.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartView};
pub use order::{Order, OrderItem, PaymentResult, ShippingAddress};
pub use product::{Product, ProductFilter, ProductPage};
pub use user::{Role, User};
