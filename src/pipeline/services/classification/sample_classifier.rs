use std::time::Duration;

use crate::config::{ClassifierSettings, SampleOutcome};
use crate::error::CollaboratorError;
use crate::pipeline::domain::{AnalysisResult, Classification, Macros, Micronutrient, PreparedImage};
use crate::pipeline::orchestration::Classifier;
use async_trait::async_trait;

/// Stand-in classifier for demos and UI work: waits a fixed delay and then
/// returns whatever outcome it was configured with.
pub struct SampleClassifier {
    outcome: SampleOutcome,
    delay: Duration,
}

impl SampleClassifier {
    pub fn new(outcome: SampleOutcome, delay: Duration) -> Self {
        Self { outcome, delay }
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self::new(
            settings.sample_outcome,
            Duration::from_millis(settings.sample_delay_ms),
        )
    }

    pub fn sample_meal() -> AnalysisResult {
        let micronutrient = |label: &str, value: &str, percentage: f64| Micronutrient {
            label: label.to_string(),
            value: value.to_string(),
            percentage,
            daily_value: format!("{}%", percentage),
        };

        AnalysisResult {
            food_name: "Grilled Salmon Salad".to_string(),
            calories: 450.0,
            macros: Macros::from_grams(35.0, 12.0, 22.0),
            micronutrients: vec![
                micronutrient("Fiber", "6g", 24.0),
                micronutrient("Sodium", "480mg", 20.0),
                micronutrient("Vitamin D", "14mcg", 70.0),
                micronutrient("Iron", "2.5mg", 14.0),
                micronutrient("Potassium", "620mg", 13.0),
            ],
            confidence: 0.98,
        }
    }
}

#[async_trait]
impl Classifier for SampleClassifier {
    async fn classify(&self, _image: &PreparedImage) -> Result<Classification, CollaboratorError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.outcome {
            SampleOutcome::Food => Ok(Classification::Food(Self::sample_meal())),
            SampleOutcome::NotFood => Ok(Classification::NotFood),
            SampleOutcome::Failure => Err(CollaboratorError::Transport(
                "sample classifier configured to fail".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "SampleClassifier"
    }
}
