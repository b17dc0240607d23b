use anyhow::{anyhow, Result};
use std::sync::Arc;

use vista_gateway::ImageClient;
use vista_persist::{MemoryThreadStore, ThreadStore};

use crate::pipeline::Pipeline;

/// Builder for constructing a Pipeline
pub struct PipelineBuilder {
    image_client: Option<Arc<dyn ImageClient>>,
    store: Option<Arc<dyn ThreadStore>>,
    serialize_threads: bool,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            image_client: None,
            store: None,
            serialize_threads: true,
        }
    }

    pub fn image_client(mut self, client: Arc<dyn ImageClient>) -> Self {
        self.image_client = Some(client);
        self
    }

    /// Defaults to an unbounded in-memory store
    pub fn thread_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run operations on the same thread one at a time (default: on).
    /// Off reproduces last-writer-wins racing between concurrent refines.
    pub fn serialize_threads(mut self, enabled: bool) -> Self {
        self.serialize_threads = enabled;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let image_client = self
            .image_client
            .ok_or_else(|| anyhow!("Image client is required"))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryThreadStore::new()));

        Ok(Pipeline::new_with_config(image_client, store, self.serialize_threads))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
