//! Seam between the API layer and the hosted model services. Handlers
//! depend on this trait, so tests can drive upload and analysis with
//! stub models instead of the network.

use std::sync::Arc;

use super::narrative::{HfTextClient, TextGenerate};
use super::vqa::{HfVqaClient, VqaModel};
use super::AnalysisError;
use crate::config::RemoteConfig;

/// Factory for the two remote model clients. Called off the async
/// runtime; implementations may block.
pub trait AnalysisBackend: Send + Sync {
    /// Load the VQA model, returning a handle ready to answer questions.
    fn load_model(&self) -> Result<Arc<dyn VqaModel>, AnalysisError>;

    /// Build the text-generation client for one analysis run.
    fn text_generator(&self) -> Result<Box<dyn TextGenerate>, AnalysisError>;
}

/// Production backend: hosted inference endpoints from [`RemoteConfig`].
pub struct RemoteBackend {
    remote: RemoteConfig,
}

impl RemoteBackend {
    pub fn new(remote: RemoteConfig) -> Self {
        Self { remote }
    }
}

impl AnalysisBackend for RemoteBackend {
    fn load_model(&self) -> Result<Arc<dyn VqaModel>, AnalysisError> {
        let client = HfVqaClient::new(&self.remote)?;
        let handle = client.load(self.remote.credential.as_deref())?;
        Ok(Arc::new(handle))
    }

    fn text_generator(&self) -> Result<Box<dyn TextGenerate>, AnalysisError> {
        Ok(Box::new(HfTextClient::new(&self.remote)?))
    }
}
