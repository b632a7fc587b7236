//! Transactional document datastore.
//!
//! Documents are JSON values grouped into named collections and decoded into
//! typed records at the boundary; a document that fails to decode is
//! reported as corruption, never silently trusted.
//!
//! Reads and writes outside a transaction are independent operations with no
//! ordering guarantee. [`Datastore::run_transaction`] is the one atomic
//! path: reads inside it record per-document versions, writes are buffered,
//! and commit applies everything only if no read document changed in the
//! meantime. Contended commits are retried by re-running the closure, so the
//! loser of a race observes the winner's writes on its next attempt.

mod memory;

pub use memory::{Datastore, Transaction};

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Collection names. One constant per document family so call sites can't
/// typo a collection into existence.
pub mod collections {
    pub const STORES: &str = "stores";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const PROMOTIONS: &str = "promotions";
    pub const REVIEWS: &str = "reviews";
    pub const BUYERS: &str = "buyers";
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "sessions";
    pub const MESSAGES: &str = "messages";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// Errors from datastore operations.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// A document could not be encoded for storage.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored document no longer matches its typed shape.
    #[error("data corruption: {0}")]
    Corruption(String),

    /// Insert of a document that already exists.
    #[error("document already exists: {collection}/{id}")]
    AlreadyExists {
        collection: &'static str,
        id: Uuid,
    },

    /// A transaction kept losing version checks and gave up.
    #[error("transaction aborted after {attempts} contended attempts")]
    Contention { attempts: u32 },
}

/// Field-equality filter for collection queries.
///
/// Matches documents whose named top-level fields equal the given JSON
/// values. An empty filter matches every document in the collection.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    /// An empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to equal `value`.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub(crate) fn matches(&self, doc: &Value) -> bool {
        self.fields
            .iter()
            .all(|(name, value)| doc.get(name) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&json!({"any": "thing"})));
    }

    #[test]
    fn test_filter_requires_all_fields() {
        let filter = Filter::new()
            .field("store_id", "abc")
            .field("code", "SAVE10");
        assert!(filter.matches(&json!({"store_id": "abc", "code": "SAVE10", "extra": 1})));
        assert!(!filter.matches(&json!({"store_id": "abc", "code": "OTHER"})));
        assert!(!filter.matches(&json!({"code": "SAVE10"})));
    }
}
