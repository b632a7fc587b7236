pub mod auth;

pub use auth::{BearerToken, OptionalBuyer, RequireBuyer};
