use std::sync::Arc;
use std::time::Instant;

use vista_gateway::{ImageClient, ImageRequest};
use vista_persist::{ThreadState, ThreadStore};
use vista_types::ValidatedPrompt;

use crate::error::PipelineError;
use crate::locks::{ThreadGuard, ThreadLocks};
use crate::outcome::GenerationOutcome;

/// Turns prompts into gateway calls and commits successful results to the
/// thread store.
///
/// The store is the source of truth for whether a thread can be refined.
/// Client-side continuation hints never reach this type.
pub struct Pipeline {
    image_client: Arc<dyn ImageClient>,
    store: Arc<dyn ThreadStore>,
    locks: Option<ThreadLocks>,
}

impl Pipeline {
    pub fn new(image_client: Arc<dyn ImageClient>, store: Arc<dyn ThreadStore>) -> Self {
        Self::new_with_config(image_client, store, true)
    }

    pub(crate) fn new_with_config(
        image_client: Arc<dyn ImageClient>,
        store: Arc<dyn ThreadStore>,
        serialize_threads: bool,
    ) -> Self {
        Self {
            image_client,
            store,
            locks: serialize_threads.then(ThreadLocks::new),
        }
    }

    pub fn builder() -> crate::builder::PipelineBuilder {
        crate::builder::PipelineBuilder::new()
    }

    pub fn image_client(&self) -> &Arc<dyn ImageClient> {
        &self.image_client
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    pub fn serializes_threads(&self) -> bool {
        self.locks.is_some()
    }

    /// Held for the whole read-call-write of one operation on a thread.
    async fn lock(&self, thread_id: &str) -> Option<ThreadGuard> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(thread_id).await),
            None => None,
        }
    }

    /// Start (or restart) a thread from a text prompt.
    ///
    /// Overwrites any prior state for the thread; iteration count resets to 1.
    pub async fn generate(&self, input: &ValidatedPrompt) -> Result<GenerationOutcome, PipelineError> {
        let _guard = self.lock(&input.thread_id).await;
        let start = Instant::now();

        let image = self
            .image_client
            .generate_image(ImageRequest::new(input.prompt.clone()))
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    thread_id = %input.thread_id,
                    provider = self.image_client.name(),
                    kind = e.kind(),
                    error = %e,
                    "Generate failed"
                );
            })?;

        let image_id = uuid::Uuid::new_v4().to_string();
        let state = ThreadState::first(
            image_id.clone(),
            image.bytes.clone(),
            image.mime_type.clone(),
            image.seed.clone(),
        );
        self.store.put(&input.thread_id, state).await?;

        tracing::info!(
            thread_id = %input.thread_id,
            image_id = %image_id,
            mime_type = %image.mime_type,
            iteration = 1,
            duration_ms = start.elapsed().as_millis() as u64,
            "Thread generated"
        );

        Ok(GenerationOutcome {
            image_id,
            mime_type: image.mime_type,
            image_bytes: image.bytes,
            seed: image.seed,
            iteration_count: 1,
        })
    }

    /// Edit the thread's latest image forward with a new prompt.
    ///
    /// On any failure the stored state is left untouched, so the thread stays
    /// refinable from its last good image.
    pub async fn refine(&self, input: &ValidatedPrompt) -> Result<GenerationOutcome, PipelineError> {
        let _guard = self.lock(&input.thread_id).await;
        let start = Instant::now();

        let previous = self
            .store
            .get(&input.thread_id)
            .await?
            .ok_or(PipelineError::ThreadNotStarted)?;

        let (base_bytes, base_mime) = previous
            .continuation()
            .ok_or(PipelineError::MissingContinuationData)?;

        let request = ImageRequest::new(input.prompt.clone()).with_base(base_bytes.to_vec(), base_mime);

        let image = self
            .image_client
            .generate_image(request)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    thread_id = %input.thread_id,
                    provider = self.image_client.name(),
                    iteration = previous.iteration_count,
                    kind = e.kind(),
                    error = %e,
                    "Refine failed; keeping previous image"
                );
            })?;

        let image_id = uuid::Uuid::new_v4().to_string();
        let next = previous.advance(
            image_id.clone(),
            image.bytes.clone(),
            image.mime_type.clone(),
            image.seed.clone(),
        );
        let iteration_count = next.iteration_count;
        self.store.put(&input.thread_id, next).await?;

        tracing::info!(
            thread_id = %input.thread_id,
            image_id = %image_id,
            mime_type = %image.mime_type,
            iteration = iteration_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Thread refined"
        );

        Ok(GenerationOutcome {
            image_id,
            mime_type: image.mime_type,
            image_bytes: image.bytes,
            seed: image.seed,
            iteration_count,
        })
    }

    /// Forget a thread. Clearing an unknown thread succeeds.
    pub async fn clear(&self, thread_id: &str) -> Result<(), PipelineError> {
        let _guard = self.lock(thread_id).await;
        let removed = self.store.delete(thread_id).await?;

        tracing::info!(thread_id = %thread_id, removed, "Thread cleared");
        Ok(())
    }
}
