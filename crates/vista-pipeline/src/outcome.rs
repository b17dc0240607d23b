use vista_types::{DataUri, ImageResponse};

/// Result of a successful generate or refine, already committed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub image_id: String,
    pub mime_type: String,
    pub image_bytes: Vec<u8>,
    pub seed: String,
    pub iteration_count: u32,
}

impl GenerationOutcome {
    pub fn data_uri(&self) -> String {
        DataUri::encode(&self.mime_type, &self.image_bytes)
    }

    pub fn to_response(&self) -> ImageResponse {
        ImageResponse {
            image_id: self.image_id.clone(),
            image_data: self.data_uri(),
            seed: self.seed.clone(),
        }
    }
}
