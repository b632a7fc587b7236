pub mod orders;
pub mod products;
pub mod promotions;
pub mod stores;
