use std::pin::Pin;
use std::sync::Arc;

use crate::error::CollaboratorError;
use crate::pipeline::domain::{Classification, PreparedImage};
use crate::pipeline::orchestration::collaborator::Classifier;
use futures::Future;
use futures::task::Context;
use futures::task::Poll;
use tower::Service;

#[derive(Clone)]
pub struct ClassificationService {
    inner: Arc<dyn Classifier>,
}

impl ClassificationService {
    pub fn new(inner: Arc<dyn Classifier>) -> Self {
        Self { inner }
    }
}

impl Service<PreparedImage> for ClassificationService {
    type Response = Classification;
    type Error = CollaboratorError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: PreparedImage) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            tracing::debug!(
                "Classifying image {} ({}) with {}",
                req.source_id(),
                req.mime_type(),
                inner.name()
            );
            inner.classify(&req).await
        })
    }
}
