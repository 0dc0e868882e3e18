use std::io::Cursor;
use std::sync::Arc;

use crate::common::{CapturedImage, ImageSource};
use crate::config::PreparationSettings;
use crate::error::CollaboratorError;
use crate::pipeline::domain::PreparedImage;
use crate::pipeline::orchestration::ImagePreparer;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;
use uuid::Uuid;

const JPEG_MIME: &str = "image/jpeg";

/// Decodes the captured photo, shrinks it so its longest side fits
/// `max_dimension` and re-encodes it as JPEG for upload.
pub struct ResizingPreparer {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl ResizingPreparer {
    pub fn new() -> Self {
        Self::from_settings(&PreparationSettings::default())
    }

    pub fn from_settings(settings: &PreparationSettings) -> Self {
        Self {
            max_dimension: settings.max_dimension.max(1),
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    async fn read_source(image: &CapturedImage) -> Result<Arc<[u8]>, CollaboratorError> {
        match image.source() {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::File(path) => Ok(Arc::from(tokio::fs::read(path).await?)),
            ImageSource::Url(url) => Err(CollaboratorError::Unsupported(format!(
                "remote image {} must be fetched before preparation",
                url
            ))),
        }
    }

    fn normalize(
        source_id: Uuid,
        bytes: &[u8],
        max_dimension: u32,
        jpeg_quality: u8,
    ) -> Result<PreparedImage, CollaboratorError> {
        let format = image::guess_format(bytes)?;
        let decoded = image::load_from_memory_with_format(bytes, format)?;
        let (width, height) = decoded.dimensions();
        debug!(
            "Decoded {} image {}x{} ({} bytes)",
            format.to_mime_type(),
            width,
            height,
            bytes.len()
        );

        let resized = if width.max(height) > max_dimension {
            decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
        } else {
            decoded
        };
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut encoded = Cursor::new(Vec::new());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, jpeg_quality))?;
        let (width, height) = rgb.dimensions();

        Ok(PreparedImage::new(
            source_id,
            encoded.into_inner(),
            JPEG_MIME,
            width,
            height,
        ))
    }
}

impl Default for ResizingPreparer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImagePreparer for ResizingPreparer {
    async fn prepare(&self, image: &CapturedImage) -> Result<PreparedImage, CollaboratorError> {
        let bytes = Self::read_source(image).await?;
        let source_id = image.id();
        let max_dimension = self.max_dimension;
        let jpeg_quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            Self::normalize(source_id, &bytes, max_dimension, jpeg_quality)
        })
        .await
        .map_err(|e| CollaboratorError::Io(format!("image preparation task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "ResizingPreparer"
    }
}
