use crate::common::CapturedImage;
use crate::error::CollaboratorError;
use crate::pipeline::domain::{Classification, PreparedImage};
use async_trait::async_trait;

/// Normalizes a captured image before it is classified.
#[async_trait]
pub trait ImagePreparer: Send + Sync {
    async fn prepare(&self, image: &CapturedImage) -> Result<PreparedImage, CollaboratorError>;
    fn name(&self) -> &'static str;
}

/// Decides whether a prepared image shows food and, if so, what is in it.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &PreparedImage) -> Result<Classification, CollaboratorError>;
    fn name(&self) -> &'static str;
}
