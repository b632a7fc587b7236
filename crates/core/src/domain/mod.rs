//! Document records stored in the datastore.
//!
//! One module per document family. These are the typed shapes every
//! collaborator decodes documents into at the boundary.

pub mod account;
pub mod cart;
pub mod messaging;
pub mod order;
pub mod product;
pub mod promotion;
pub mod review;
pub mod store;

pub use account::{Buyer, Seller};
pub use cart::{CartItem, cart_subtotal};
pub use messaging::{Message, Notification};
pub use order::{AppliedDiscount, Order, OrderItem, ShippingAddress, next_order_number};
pub use product::Product;
pub use promotion::{Promotion, PromotionConditions, PromotionUsage};
pub use review::{Rating, Review};
pub use store::{Store, StoreName, StoreNameError, StoreSettings};
