//! Shoplane Core - Shared domain types library.
//!
//! This crate provides the document types and value types used across all
//! Shoplane components:
//! - `backend` - Backend collaborators (datastore, identity, email, events)
//! - `storefront` - Buyer-facing HTTP service
//! - `admin` - Seller-facing HTTP service
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! datastore access, no HTTP clients. Every document read from the datastore
//! is decoded into one of the records defined here; malformed documents are
//! rejected at that boundary rather than trusted.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, money, and statuses
//! - [`domain`] - Document records: stores, products, promotions, orders, reviews

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod domain;
pub mod types;

pub use domain::*;
pub use types::*;
