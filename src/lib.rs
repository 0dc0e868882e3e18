pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod presentation;

pub use common::{CapturedImage, ImageSource};
pub use config::Configuration;
pub use error::{AnalysisError, AppError, CollaboratorError, WorkflowError};
pub use pipeline::{
    AnalysisController, AnalysisResult, AnalysisWorkflow, Classification, Classifier,
    ImagePreparer, StateSubscription, WorkflowState,
};
