//! Document change feed.
//!
//! Every committed datastore write publishes a [`DocumentEvent`]. Consumers
//! subscribe with a filter and pull matching events; dropping the
//! [`Subscription`] unsubscribes. Delivery is best-effort: a subscriber that
//! falls behind the channel capacity skips the missed events and keeps
//! going, which is acceptable for live message and notification feeds that
//! re-query on demand.

use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Channel capacity before slow subscribers start lagging.
const EVENT_CAPACITY: usize = 256;

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One committed change to one document.
#[derive(Debug, Clone)]
pub struct DocumentEvent {
    pub collection: &'static str,
    pub id: Uuid,
    pub kind: ChangeKind,
    /// The document's `store_id` field, when it has one, for tenant-scoped
    /// filtering.
    pub store_id: Option<Uuid>,
}

impl DocumentEvent {
    /// Build an event from a document body, pulling out its `store_id`.
    #[must_use]
    pub fn new(collection: &'static str, id: Uuid, kind: ChangeKind, data: &Value) -> Self {
        let store_id = data
            .get("store_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        Self {
            collection,
            id,
            kind,
            store_id,
        }
    }
}

/// Which events a subscription wants.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    collection: Option<&'static str>,
    store_id: Option<Uuid>,
}

impl EventFilter {
    /// Match every event.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to one collection.
    #[must_use]
    pub const fn collection(mut self, collection: &'static str) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Restrict to documents belonging to one store.
    #[must_use]
    pub const fn for_store(mut self, store_id: Uuid) -> Self {
        self.store_id = Some(store_id);
        self
    }

    fn matches(&self, event: &DocumentEvent) -> bool {
        if let Some(collection) = self.collection
            && collection != event.collection
        {
            return false;
        }
        if let Some(store_id) = self.store_id
            && event.store_id != Some(store_id)
        {
            return false;
        }
        true
    }
}

/// Publisher half of the change feed.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<DocumentEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    /// Create a hub with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event. A feed with no subscribers drops it silently.
    pub fn publish(&self, event: DocumentEvent) {
        let _ = self.sender.send(event);
    }

    /// Open a filtered subscription starting from now.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }
}

/// Consumer half of the change feed. Drop to unsubscribe.
pub struct Subscription {
    receiver: broadcast::Receiver<DocumentEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Wait for the next matching event.
    ///
    /// Returns `None` once the hub is gone. Lagged gaps are logged and
    /// skipped.
    pub async fn next(&mut self) -> Option<DocumentEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged, skipping missed events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
