use serde::Serialize;

use crate::pipeline::{AnalysisResult, Macros, WorkflowState};

/// What the recognition screen shows for a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionSummary {
    pub food_name: String,
    pub confidence: String,
    pub calories: f64,
    pub macros: Macros,
}

impl RecognitionSummary {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            food_name: result.food_name.clone(),
            confidence: confidence_label(result.confidence),
            calories: result.calories,
            macros: result.macros.clone(),
        }
    }

    /// Only a `Success` state has anything to show.
    pub fn from_state(state: &WorkflowState) -> Option<Self> {
        state.result().map(Self::from_result)
    }
}

pub fn confidence_label(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::SampleClassifier;

    #[test]
    fn rounds_confidence_to_a_percentage() {
        assert_eq!(confidence_label(0.98), "98%");
        assert_eq!(confidence_label(0.875), "88%");
        assert_eq!(confidence_label(1.0), "100%");
        assert_eq!(confidence_label(0.0), "0%");
    }

    #[test]
    fn only_success_has_a_summary() {
        assert_eq!(RecognitionSummary::from_state(&WorkflowState::Analyzing), None);
        assert_eq!(RecognitionSummary::from_state(&WorkflowState::Error), None);

        let state = WorkflowState::Success(SampleClassifier::sample_meal());
        let summary = RecognitionSummary::from_state(&state).unwrap();
        assert_eq!(summary.food_name, "Grilled Salmon Salad");
        assert_eq!(summary.confidence, "98%");
        assert_eq!(summary.calories, 450.0);
    }
}
