use std::sync::Arc;
use uuid::Uuid;

/// Normalized image handle produced by the preparation phase.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    source_id: Uuid,
    bytes: Arc<[u8]>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl PreparedImage {
    pub fn new(
        source_id: Uuid,
        bytes: impl Into<Arc<[u8]>>,
        mime_type: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            source_id,
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            width,
            height,
        }
    }

    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
