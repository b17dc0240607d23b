use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal continuation state needed for the next refinement of a thread.
///
/// Only the latest image is kept; earlier iterations are not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    pub last_image_id: String,
    /// Required input to the next refine. `None` makes refine illegal.
    pub last_image_bytes: Option<Vec<u8>>,
    pub mime_type: String,
    pub last_seed: String,
    /// Successful generations and refinements since the last generate (starts at 1).
    pub iteration_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl ThreadState {
    /// State after a successful generate.
    pub fn first(
        image_id: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            last_image_id: image_id.into(),
            last_image_bytes: Some(bytes),
            mime_type: mime_type.into(),
            last_seed: seed.into(),
            iteration_count: 1,
            updated_at: Utc::now(),
        }
    }

    /// Successor state after a successful refine.
    pub fn advance(
        &self,
        image_id: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            last_image_id: image_id.into(),
            last_image_bytes: Some(bytes),
            mime_type: mime_type.into(),
            last_seed: seed.into(),
            iteration_count: self.iteration_count.saturating_add(1),
            updated_at: Utc::now(),
        }
    }

    /// The base image for the next refine, if this state can be refined.
    pub fn continuation(&self) -> Option<(&[u8], &str)> {
        self.last_image_bytes
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| (bytes, self.mime_type.as_str()))
    }
}
