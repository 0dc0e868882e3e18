use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Where the bytes of a captured image live.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Arc<[u8]>),
    File(PathBuf),
    Url(String),
}

/// A photo handed to the analysis workflow by a capture or file-selection
/// action. Cloning shares the underlying bytes.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    id: Uuid,
    source: ImageSource,
    captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(source: ImageSource, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            captured_at,
        }
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(ImageSource::Bytes(bytes.into()), Utc::now())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ImageSource::File(path.into()), Utc::now())
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(ImageSource::Url(url.into()), Utc::now())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
