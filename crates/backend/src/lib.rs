//! Shoplane Backend - the managed-backend collaborators behind typed
//! interfaces.
//!
//! The original platform delegated persistence, auth, and email to hosted
//! services. This crate reimplements those collaborators in-process so the
//! business rules above them have explicit contracts to hold onto:
//!
//! - [`datastore`] - transactional document store (collections of versioned
//!   JSON documents, equality-filter queries, optimistic transactions)
//! - [`identity`] - two-realm account service with bearer sessions
//! - [`mailer`] - fire-and-forget email-sending client
//! - [`events`] - best-effort document change feed for live subscriptions
//!
//! [`Backend`] bundles one of each for a service's application state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod datastore;
pub mod events;
pub mod identity;
pub mod mailer;

use datastore::Datastore;
use events::EventHub;
use identity::IdentityService;
use mailer::Mailer;

/// One handle per backend collaborator, cheaply cloneable.
#[derive(Clone)]
pub struct Backend {
    datastore: Datastore,
    identity: IdentityService,
    mailer: Mailer,
}

impl Backend {
    /// Create an in-memory backend with the given mailer.
    #[must_use]
    pub fn in_memory(mailer: Mailer) -> Self {
        let datastore = Datastore::new();
        let identity = IdentityService::new(datastore.clone());
        Self {
            datastore,
            identity,
            mailer,
        }
    }

    /// The document datastore.
    #[must_use]
    pub const fn datastore(&self) -> &Datastore {
        &self.datastore
    }

    /// The identity/session service.
    #[must_use]
    pub const fn identity(&self) -> &IdentityService {
        &self.identity
    }

    /// The email-sending client.
    #[must_use]
    pub const fn mailer(&self) -> &Mailer {
        &self.mailer
    }

    /// The document change feed.
    #[must_use]
    pub fn events(&self) -> EventHub {
        self.datastore.events()
    }
}
