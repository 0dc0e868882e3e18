use std::pin::Pin;
use std::sync::Arc;

use crate::common::CapturedImage;
use crate::error::CollaboratorError;
use crate::pipeline::domain::PreparedImage;
use crate::pipeline::orchestration::collaborator::ImagePreparer;
use futures::Future;
use futures::task::Context;
use futures::task::Poll;
use tower::Service;

#[derive(Clone)]
pub struct PreparationService {
    inner: Arc<dyn ImagePreparer>,
}

impl PreparationService {
    pub fn new(inner: Arc<dyn ImagePreparer>) -> Self {
        Self { inner }
    }
}

impl Service<CapturedImage> for PreparationService {
    type Response = PreparedImage;
    type Error = CollaboratorError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CapturedImage) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            tracing::debug!("Preparing image {} with {}", req.id(), inner.name());
            inner.prepare(&req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tower::ServiceExt;

    struct EchoPreparer;

    #[async_trait]
    impl ImagePreparer for EchoPreparer {
        async fn prepare(&self, image: &CapturedImage) -> Result<PreparedImage, CollaboratorError> {
            Ok(PreparedImage::new(image.id(), vec![0u8; 4], "image/jpeg", 2, 2))
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_preparation_service() {
        let service = PreparationService::new(Arc::new(EchoPreparer));
        let image = CapturedImage::from_bytes(vec![1u8, 2, 3]);
        let prepared = service.oneshot(image.clone()).await.unwrap();
        assert_eq!(prepared.source_id(), image.id());
        assert_eq!(prepared.dimensions(), (2, 2));
    }
}
