//! In-memory datastore engine with optimistic transactions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::events::{ChangeKind, DocumentEvent, EventHub};

use super::{DatastoreError, Filter};

/// How many times a transaction closure is re-run after losing a version
/// check before the whole transaction fails with `Contention`.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    data: Value,
}

type Collections = HashMap<&'static str, HashMap<Uuid, Versioned>>;

/// The document datastore handle.
///
/// Cheaply cloneable; all clones share the same collections and change feed.
#[derive(Clone)]
pub struct Datastore {
    collections: Arc<RwLock<Collections>>,
    events: EventHub,
}

impl Default for Datastore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore {
    /// Create an empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            events: EventHub::new(),
        }
    }

    /// The change feed fed by every committed write.
    #[must_use]
    pub fn events(&self) -> EventHub {
        self.events.clone()
    }

    /// Cheap liveness probe for readiness checks.
    pub async fn ping(&self) -> Result<(), DatastoreError> {
        drop(self.read());
        Ok(())
    }

    /// Fetch and decode one document.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the stored document does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        id: Uuid,
    ) -> Result<Option<T>, DatastoreError> {
        let guard = self.read();
        guard
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .map(|doc| decode(collection, id, &doc.data))
            .transpose()
    }

    /// Create a document, failing if the ID is already taken.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` on ID collision, `Encode` if the document
    /// cannot be serialized.
    pub async fn insert<T: Serialize>(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: &T,
    ) -> Result<(), DatastoreError> {
        let data = encode(doc)?;
        let event = {
            let mut guard = self.write();
            let docs = guard.entry(collection).or_default();
            if docs.contains_key(&id) {
                return Err(DatastoreError::AlreadyExists { collection, id });
            }
            let event = DocumentEvent::new(collection, id, ChangeKind::Created, &data);
            docs.insert(id, Versioned { version: 1, data });
            event
        };
        self.events.publish(event);
        Ok(())
    }

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns `Encode` if the document cannot be serialized.
    pub async fn put<T: Serialize>(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: &T,
    ) -> Result<(), DatastoreError> {
        let data = encode(doc)?;
        let event = {
            let mut guard = self.write();
            let docs = guard.entry(collection).or_default();
            let kind = if docs.contains_key(&id) {
                ChangeKind::Updated
            } else {
                ChangeKind::Created
            };
            let event = DocumentEvent::new(collection, id, kind, &data);
            let version = docs.get(&id).map_or(0, |doc| doc.version) + 1;
            docs.insert(id, Versioned { version, data });
            event
        };
        self.events.publish(event);
        Ok(())
    }

    /// Delete a document, returning whether it existed.
    pub async fn delete(
        &self,
        collection: &'static str,
        id: Uuid,
    ) -> Result<bool, DatastoreError> {
        let removed = {
            let mut guard = self.write();
            guard
                .get_mut(collection)
                .and_then(|docs| docs.remove(&id))
        };
        match removed {
            Some(doc) => {
                self.events.publish(DocumentEvent::new(
                    collection,
                    id,
                    ChangeKind::Deleted,
                    &doc.data,
                ));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch and decode every document matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if any matching document does not decode as `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<Vec<T>, DatastoreError> {
        let guard = self.read();
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        docs.iter()
            .filter(|(_, doc)| filter.matches(&doc.data))
            .map(|(id, doc)| decode(collection, *id, &doc.data))
            .collect()
    }

    /// Run a closure as one atomic, isolated transaction.
    ///
    /// The closure's reads record document versions and its writes are
    /// buffered; commit applies the writes only if every read document is
    /// still at its recorded version. On a version conflict the closure is
    /// re-run against fresh state, up to a bounded attempt count. A business
    /// error returned by the closure aborts immediately without retrying and
    /// without writing anything.
    ///
    /// # Errors
    ///
    /// Returns the closure's error unchanged, or
    /// `DatastoreError::Contention` (converted into `E`) when retries are
    /// exhausted.
    pub async fn run_transaction<T, E, F>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, E>,
        E: From<DatastoreError>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut tx = Transaction {
                store: self,
                reads: HashMap::new(),
                writes: Vec::new(),
            };
            let out = f(&mut tx)?;
            match self.commit(tx) {
                Ok(events) => {
                    for event in events {
                        self.events.publish(event);
                    }
                    return Ok(out);
                }
                Err(()) if attempts < MAX_TRANSACTION_ATTEMPTS => {
                    tracing::debug!(attempts, "transaction contended, retrying");
                }
                Err(()) => {
                    return Err(E::from(DatastoreError::Contention { attempts }));
                }
            }
        }
    }

    /// Validate read versions and apply buffered writes under the write
    /// lock. `Err(())` signals a version conflict.
    fn commit(&self, tx: Transaction<'_>) -> Result<Vec<DocumentEvent>, ()> {
        let mut guard = self.write();

        for ((collection, id), read_version) in &tx.reads {
            let current = guard
                .get(*collection)
                .and_then(|docs| docs.get(id))
                .map_or(0, |doc| doc.version);
            if current != *read_version {
                return Err(());
            }
        }

        let mut events = Vec::with_capacity(tx.writes.len());
        for write in tx.writes {
            match write {
                PendingWrite::Put {
                    collection,
                    id,
                    data,
                } => {
                    let docs = guard.entry(collection).or_default();
                    let kind = if docs.contains_key(&id) {
                        ChangeKind::Updated
                    } else {
                        ChangeKind::Created
                    };
                    events.push(DocumentEvent::new(collection, id, kind, &data));
                    let version = docs.get(&id).map_or(0, |doc| doc.version) + 1;
                    docs.insert(id, Versioned { version, data });
                }
                PendingWrite::Delete { collection, id } => {
                    if let Some(doc) = guard
                        .get_mut(collection)
                        .and_then(|docs| docs.remove(&id))
                    {
                        events.push(DocumentEvent::new(
                            collection,
                            id,
                            ChangeKind::Deleted,
                            &doc.data,
                        ));
                    }
                }
            }
        }

        Ok(events)
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

enum PendingWrite {
    Put {
        collection: &'static str,
        id: Uuid,
        data: Value,
    },
    Delete {
        collection: &'static str,
        id: Uuid,
    },
}

/// Read/write context handed to a transaction closure.
///
/// Reads see the transaction's own buffered writes before committed state.
pub struct Transaction<'a> {
    store: &'a Datastore,
    reads: HashMap<(&'static str, Uuid), u64>,
    writes: Vec<PendingWrite>,
}

impl Transaction<'_> {
    /// Fetch and decode one document, recording its version for the commit
    /// check.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the document does not decode as `T`.
    pub fn get<T: DeserializeOwned>(
        &mut self,
        collection: &'static str,
        id: Uuid,
    ) -> Result<Option<T>, DatastoreError> {
        for write in self.writes.iter().rev() {
            match write {
                PendingWrite::Put {
                    collection: c,
                    id: wid,
                    data,
                } if *c == collection && *wid == id => {
                    return decode(collection, id, data).map(Some);
                }
                PendingWrite::Delete {
                    collection: c,
                    id: wid,
                } if *c == collection && *wid == id => return Ok(None),
                _ => {}
            }
        }

        let guard = self.store.read();
        let entry = guard.get(collection).and_then(|docs| docs.get(&id));
        self.reads
            .insert((collection, id), entry.map_or(0, |doc| doc.version));
        entry.map(|doc| decode(collection, id, &doc.data)).transpose()
    }

    /// Buffer a create-or-replace write.
    ///
    /// # Errors
    ///
    /// Returns `Encode` if the document cannot be serialized.
    pub fn put<T: Serialize>(
        &mut self,
        collection: &'static str,
        id: Uuid,
        doc: &T,
    ) -> Result<(), DatastoreError> {
        let data = encode(doc)?;
        self.writes.push(PendingWrite::Put {
            collection,
            id,
            data,
        });
        Ok(())
    }

    /// Buffer a delete.
    pub fn delete(&mut self, collection: &'static str, id: Uuid) {
        self.writes.push(PendingWrite::Delete { collection, id });
    }
}

fn encode<T: Serialize>(doc: &T) -> Result<Value, DatastoreError> {
    serde_json::to_value(doc).map_err(DatastoreError::Encode)
}

fn decode<T: DeserializeOwned>(
    collection: &'static str,
    id: Uuid,
    data: &Value,
) -> Result<T, DatastoreError> {
    serde_json::from_value(data.clone()).map_err(|e| {
        DatastoreError::Corruption(format!("invalid document {collection}/{id}: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::super::collections;
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        store_id: String,
        value: i64,
    }

    fn counter(value: i64) -> Counter {
        Counter {
            store_id: "s1".to_owned(),
            value,
        }
    }

    #[tokio::test]
    async fn test_get_returns_inserted_document() {
        let store = Datastore::new();
        let id = Uuid::new_v4();
        store
            .insert(collections::PRODUCTS, id, &counter(7))
            .await
            .unwrap();

        let loaded: Option<Counter> = store.get(collections::PRODUCTS, id).await.unwrap();
        assert_eq!(loaded, Some(counter(7)));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = Datastore::new();
        let id = Uuid::new_v4();
        store
            .insert(collections::PRODUCTS, id, &counter(1))
            .await
            .unwrap();

        let err = store
            .insert(collections::PRODUCTS, id, &counter(2))
            .await
            .unwrap_err();
        assert!(matches!(err, DatastoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_query_filters_by_field() {
        let store = Datastore::new();
        store
            .insert(collections::PRODUCTS, Uuid::new_v4(), &counter(1))
            .await
            .unwrap();
        let other = Counter {
            store_id: "s2".to_owned(),
            value: 2,
        };
        store
            .insert(collections::PRODUCTS, Uuid::new_v4(), &other)
            .await
            .unwrap();

        let matched: Vec<Counter> = store
            .query(collections::PRODUCTS, &Filter::new().field("store_id", "s1"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().value, 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_rejected() {
        let store = Datastore::new();
        let id = Uuid::new_v4();
        store
            .insert(collections::PRODUCTS, id, &serde_json::json!({"value": "not a number"}))
            .await
            .unwrap();

        let err = store
            .get::<Counter>(collections::PRODUCTS, id)
            .await
            .unwrap_err();
        assert!(matches!(err, DatastoreError::Corruption(_)));
    }

    #[tokio::test]
    async fn test_transaction_reads_own_writes() {
        let store = Datastore::new();
        let id = Uuid::new_v4();

        store
            .run_transaction::<_, DatastoreError, _>(|tx| {
                tx.put(collections::PRODUCTS, id, &counter(5))?;
                let seen: Option<Counter> = tx.get(collections::PRODUCTS, id)?;
                assert_eq!(seen, Some(counter(5)));
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_business_error_aborts_without_writing() {
        let store = Datastore::new();
        let id = Uuid::new_v4();

        let result: Result<(), DatastoreError> = store
            .run_transaction(|tx| {
                tx.put(collections::PRODUCTS, id, &counter(5))?;
                Err(DatastoreError::Corruption("abort".to_owned()))
            })
            .await;

        assert!(result.is_err());
        let loaded: Option<Counter> = store.get(collections::PRODUCTS, id).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_contended_decrements_serialize() {
        let store = Datastore::new();
        let id = Uuid::new_v4();
        store
            .insert(collections::PRODUCTS, id, &counter(1))
            .await
            .unwrap();

        // Two concurrent transactions each try to take the last unit.
        let attempt = |store: Datastore| async move {
            store
                .run_transaction::<_, DatastoreError, _>(|tx| {
                    let current: Counter = tx
                        .get(collections::PRODUCTS, id)?
                        .ok_or_else(|| DatastoreError::Corruption("missing".to_owned()))?;
                    if current.value < 1 {
                        return Err(DatastoreError::Corruption("sold out".to_owned()));
                    }
                    tx.put(
                        collections::PRODUCTS,
                        id,
                        &Counter {
                            value: current.value - 1,
                            ..current
                        },
                    )?;
                    Ok(())
                })
                .await
        };

        let (a, b) = tokio::join!(attempt(store.clone()), attempt(store.clone()));
        assert!(a.is_ok() ^ b.is_ok(), "exactly one decrement must win");

        let final_state: Counter = store
            .get(collections::PRODUCTS, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(final_state.value, 0);
    }
}
