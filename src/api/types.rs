//! Shared context for the API layer.

use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::pipeline::backend::{AnalysisBackend, RemoteBackend};
use crate::session::SessionStore;

/// Shared state for all API routes: the session store plus the backend
/// that produces the model clients.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<SessionStore>,
    pub backend: Arc<dyn AnalysisBackend>,
}

impl ApiContext {
    pub fn new(remote: RemoteConfig) -> Self {
        Self::with_backend(Arc::new(RemoteBackend::new(remote)))
    }

    pub fn with_backend(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            backend,
        }
    }
}
