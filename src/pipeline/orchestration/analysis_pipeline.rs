use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::common::CapturedImage;
use crate::error::{AnalysisError, AppError, CollaboratorError};
use crate::pipeline::domain::{AnalysisResult, Classification, PreparedImage};
use crate::pipeline::orchestration::collaborator::{Classifier, ImagePreparer};
use crate::pipeline::orchestration::service::{ClassificationService, PreparationService};
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, ServiceBuilder, ServiceExt};

type PreparationStep = BoxCloneSyncService<CapturedImage, PreparedImage, BoxError>;
type ClassificationStep = BoxCloneSyncService<PreparedImage, Classification, BoxError>;

/// The two collaborator calls of a submission, each behind its own timeout.
#[derive(Clone)]
pub struct AnalysisPipeline {
    preparation: PreparationStep,
    classification: ClassificationStep,
    preparation_timeout: Option<Duration>,
    classification_timeout: Option<Duration>,
}

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn prepare(
        &self,
        image: CapturedImage,
    ) -> impl Future<Output = Result<PreparedImage, AnalysisError>> + Send + 'static {
        let service = self.preparation.clone();
        let timeout = self.preparation_timeout;
        async move {
            service.oneshot(image).await.map_err(|e| {
                AnalysisError::PreparationFailed(into_collaborator_error(e, timeout))
            })
        }
    }

    /// Runs classification and turns the verdict into a complete result or an error.
    pub fn classify(
        &self,
        image: PreparedImage,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send + 'static {
        let service = self.classification.clone();
        let timeout = self.classification_timeout;
        async move {
            let classification = service.oneshot(image).await.map_err(|e| {
                AnalysisError::ClassificationFailed(into_collaborator_error(e, timeout))
            })?;

            match classification {
                Classification::Food(result) => {
                    result
                        .validate()
                        .map_err(AnalysisError::ClassificationFailed)?;
                    Ok(result)
                }
                Classification::NotFood => Err(AnalysisError::NotFood),
            }
        }
    }
}

fn into_collaborator_error(error: BoxError, timeout: Option<Duration>) -> CollaboratorError {
    if error.is::<Elapsed>() {
        return CollaboratorError::Timeout(timeout.unwrap_or_default());
    }
    match error.downcast::<CollaboratorError>() {
        Ok(error) => *error,
        Err(other) => CollaboratorError::Transport(other.to_string()),
    }
}

#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    preparer: Option<Arc<dyn ImagePreparer>>,
    classifier: Option<Arc<dyn Classifier>>,
    preparation_timeout: Option<Duration>,
    classification_timeout: Option<Duration>,
}

impl AnalysisPipelineBuilder {
    pub fn preparer(mut self, preparer: Arc<dyn ImagePreparer>) -> Self {
        self.preparer = Some(preparer);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn preparation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.preparation_timeout = timeout;
        self
    }

    pub fn classification_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.classification_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<AnalysisPipeline, AppError> {
        let preparer = self
            .preparer
            .ok_or(AppError::Pipeline("Image preparer not set".to_string()))?;
        let classifier = self
            .classifier
            .ok_or(AppError::Pipeline("Classifier not set".to_string()))?;

        let preparation = ServiceBuilder::new()
            .option_layer(self.preparation_timeout.map(TimeoutLayer::new))
            .map_err(|e: CollaboratorError| BoxError::from(e))
            .service(PreparationService::new(preparer));
        let classification = ServiceBuilder::new()
            .option_layer(self.classification_timeout.map(TimeoutLayer::new))
            .map_err(|e: CollaboratorError| BoxError::from(e))
            .service(ClassificationService::new(classifier));

        Ok(AnalysisPipeline {
            preparation: BoxCloneSyncService::new(preparation),
            classification: BoxCloneSyncService::new(classification),
            preparation_timeout: self.preparation_timeout,
            classification_timeout: self.classification_timeout,
        })
    }
}
