//! Shared application state.

use std::sync::Arc;

use shoplane_backend::Backend;
use shoplane_backend::datastore::Datastore;
use shoplane_backend::events::EventHub;
use shoplane_backend::identity::IdentityService;
use shoplane_backend::mailer::Mailer;

use crate::config::AdminConfig;

/// Handle cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: AdminConfig,
    backend: Backend,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, backend: Backend) -> Self {
        Self {
            inner: Arc::new(Inner { config, backend }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn datastore(&self) -> &Datastore {
        self.inner.backend.datastore()
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        self.inner.backend.identity()
    }

    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        self.inner.backend.mailer()
    }

    #[must_use]
    pub fn events(&self) -> EventHub {
        self.inner.backend.events()
    }
}
