pub mod auth;

pub use auth::{BearerToken, RequireSeller};
