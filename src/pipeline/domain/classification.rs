use super::analysis_result::AnalysisResult;

/// Verdict of the classification collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Food(AnalysisResult),
    NotFood,
}

impl Classification {
    pub fn is_food(&self) -> bool {
        matches!(self, Classification::Food(_))
    }
}
