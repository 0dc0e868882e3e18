use std::sync::Arc;

use chrono::Utc;
use nutrisnap::config::{Configuration, DEFAULT_CONFIG_FILE};
use nutrisnap::pipeline::services::{ResizingPreparer, SampleClassifier};
use nutrisnap::presentation::{FitnessSyncPayload, RecognitionSummary};
use nutrisnap::{AnalysisWorkflow, AppError, CapturedImage, WorkflowState};
use tracing::{error, info};

fn init_logging(configuration: &Configuration) {
    tracing_subscriber::fmt()
        .with_max_level(configuration.log_level())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let configuration = Configuration::load(DEFAULT_CONFIG_FILE)?;
    init_logging(&configuration);

    let image_path = std::env::args()
        .nth(1)
        .ok_or_else(|| AppError::Usage("usage: nutrisnap <image-path>".to_string()))?;

    let workflow = AnalysisWorkflow::builder(&configuration)
        .preparer(Arc::new(ResizingPreparer::from_settings(
            &configuration.preparation,
        )))
        .classifier(Arc::new(SampleClassifier::from_settings(
            &configuration.classifier,
        )))
        .build()?;

    let controller = workflow.submit(CapturedImage::from_path(&image_path));
    let mut subscription = controller.subscribe();

    while let Some(state) = subscription.next().await {
        info!("{} is {}", image_path, state.kind());
        match state {
            WorkflowState::Success(result) => {
                let summary = RecognitionSummary::from_result(&result);
                info!("Recognized: {}", serde_json::to_string(&summary)?);
                let payload = FitnessSyncPayload::for_meal(&configuration.user_id, &result, Utc::now());
                info!("Fitness sync payload: {}", payload.to_json()?);
                break;
            }
            WorkflowState::Error => {
                if let Some(failure) = controller.failure() {
                    error!("Analysis failed ({}): {}", failure.code(), failure);
                    return Err(failure.into());
                }
                break;
            }
            WorkflowState::Preparing | WorkflowState::Analyzing => {}
        }
    }

    Ok(())
}
