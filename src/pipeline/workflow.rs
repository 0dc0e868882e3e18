use std::sync::Arc;
use std::time::Duration;

use crate::common::CapturedImage;
use crate::config::Configuration;
use crate::error::AppError;
use crate::pipeline::controller::AnalysisController;
use crate::pipeline::orchestration::{AnalysisPipeline, Classifier, ImagePreparer};

/// Hands out one [`AnalysisController`] per submitted image. Controllers share
/// the collaborators but no mutable state.
#[derive(Clone)]
pub struct AnalysisWorkflow {
    pipeline: AnalysisPipeline,
    event_buffer_size: usize,
}

impl AnalysisWorkflow {
    pub fn builder(configuration: &Configuration) -> AnalysisWorkflowBuilder {
        AnalysisWorkflowBuilder::new(configuration)
    }

    pub fn submit(&self, image: CapturedImage) -> AnalysisController {
        AnalysisController::submit(self.pipeline.clone(), image, self.event_buffer_size)
    }
}

pub struct AnalysisWorkflowBuilder {
    preparer: Option<Arc<dyn ImagePreparer>>,
    classifier: Option<Arc<dyn Classifier>>,
    preparation_timeout: Option<Duration>,
    classification_timeout: Option<Duration>,
    event_buffer_size: usize,
}

impl AnalysisWorkflowBuilder {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            preparer: None,
            classifier: None,
            preparation_timeout: configuration.workflow.preparation_timeout(),
            classification_timeout: configuration.workflow.classification_timeout(),
            event_buffer_size: configuration.workflow.event_buffer_size,
        }
    }

    pub fn preparer(mut self, preparer: Arc<dyn ImagePreparer>) -> Self {
        self.preparer = Some(preparer);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    // Overrides the configured preparation timeout, `None` waits forever.
    pub fn preparation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.preparation_timeout = timeout;
        self
    }

    // Overrides the configured classification timeout, `None` waits forever.
    pub fn classification_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.classification_timeout = timeout;
        self
    }

    pub fn event_buffer_size(mut self, event_buffer_size: usize) -> Self {
        self.event_buffer_size = event_buffer_size;
        self
    }

    pub fn build(self) -> Result<AnalysisWorkflow, AppError> {
        let mut pipeline = AnalysisPipeline::builder()
            .preparation_timeout(self.preparation_timeout)
            .classification_timeout(self.classification_timeout);
        if let Some(preparer) = self.preparer {
            pipeline = pipeline.preparer(preparer);
        }
        if let Some(classifier) = self.classifier {
            pipeline = pipeline.classifier(classifier);
        }

        Ok(AnalysisWorkflow {
            pipeline: pipeline.build()?,
            event_buffer_size: self.event_buffer_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleOutcome;
    use crate::pipeline::context::WorkflowState;
    use crate::pipeline::services::{ResizingPreparer, SampleClassifier};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            32,
            32,
            Rgb([90, 160, 60]),
        ));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    fn workflow(outcome: SampleOutcome) -> AnalysisWorkflow {
        AnalysisWorkflow::builder(&Configuration::default())
            .preparer(Arc::new(ResizingPreparer::new()))
            .classifier(Arc::new(SampleClassifier::new(outcome, Duration::ZERO)))
            .build()
            .expect("Failed to build workflow")
    }

    #[test]
    fn build_fails_without_collaborators() {
        let result = AnalysisWorkflow::builder(&Configuration::default()).build();
        assert!(matches!(result, Err(AppError::Pipeline(_))));
    }

    #[tokio::test]
    async fn real_preparation_with_sample_classification() {
        let controller = workflow(SampleOutcome::Food).submit(CapturedImage::from_bytes(jpeg_bytes()));
        assert_eq!(
            controller.outcome().await,
            Some(WorkflowState::Success(SampleClassifier::sample_meal()))
        );
    }

    #[tokio::test]
    async fn undecodable_capture_ends_in_error() {
        let controller =
            workflow(SampleOutcome::Food).submit(CapturedImage::from_bytes(vec![0u8; 16]));
        assert_eq!(controller.outcome().await, Some(WorkflowState::Error));
        assert_eq!(
            controller.failure().map(|failure| failure.code()),
            Some("preparation_failed")
        );
    }

    #[tokio::test]
    async fn each_submission_gets_its_own_controller() {
        let workflow = workflow(SampleOutcome::NotFood);
        let image = CapturedImage::from_bytes(jpeg_bytes());
        let first = workflow.submit(image.clone());
        let second = workflow.submit(image);

        assert_eq!(first.outcome().await, Some(WorkflowState::Error));
        assert_eq!(second.outcome().await, Some(WorkflowState::Error));
        assert_eq!(second.metrics().attempts(), 1);
    }
}
