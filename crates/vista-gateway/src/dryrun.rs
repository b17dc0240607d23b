// Offline provider: deterministic solid-color PNGs, no network.

use crate::error::GatewayError;
use crate::traits::{GeneratedImage, ImageClient, ImageRequest};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_SIZE: u32 = 64;

#[derive(Debug)]
pub struct DryRunClient {
    size: u32,
    calls: AtomicU64,
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_SIZE)
    }

    pub fn with_size(size: u32) -> Self {
        Self {
            size: size.max(1),
            calls: AtomicU64::new(0),
        }
    }
}

impl Default for DryRunClient {
    fn default() -> Self {
        Self::new()
    }
}

fn color_from_prompt(prompt: &str) -> [u8; 3] {
    let digest = Sha256::digest(prompt.as_bytes());
    [digest[0], digest[1], digest[2]]
}

/// Mean color of a decodable base image; `None` for formats we can't read.
fn average_color(bytes: &[u8]) -> Option<[u8; 3]> {
    let image = image::load_from_memory(bytes).ok()?.to_rgb8();
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return None;
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    Some(sums.map(|sum| (sum / count) as u8))
}

fn blend(a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    [0usize, 1, 2].map(|i| ((u16::from(a[i]) + u16::from(b[i])) / 2) as u8)
}

#[async_trait]
impl ImageClient for DryRunClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;

        let mut color = color_from_prompt(&request.prompt);
        if let Some(base) = request.base.as_ref().and_then(|base| average_color(&base.bytes)) {
            color = blend(color, base);
        }

        let image = RgbImage::from_pixel(self.size, self.size, Rgb(color));
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| GatewayError::Upstream(format!("Dry-run encode failed: {}", e)))?;

        Ok(GeneratedImage {
            bytes: buffer.into_inner(),
            mime_type: "image/png".to_string(),
            seed: format!("dryrun-{:04}", call),
        })
    }
}
