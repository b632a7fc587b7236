pub mod checkout;
pub mod promotions;
pub mod reviews;
