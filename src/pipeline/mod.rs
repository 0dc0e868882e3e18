pub mod context;
pub mod controller;
pub mod domain;
pub mod orchestration;
pub mod services;
pub mod workflow;

pub use context::{StateKind, WorkflowMetrics, WorkflowPhase, WorkflowState};
pub use controller::{AnalysisController, StateSubscription};
pub use domain::{AnalysisResult, Classification, Macros, Micronutrient, PreparedImage};
pub use orchestration::{AnalysisPipeline, Classifier, ImagePreparer};
pub use workflow::{AnalysisWorkflow, AnalysisWorkflowBuilder};
