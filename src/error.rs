use std::time::Duration;

use thiserror::Error;

use crate::pipeline::context::state::StateKind;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Workflow Error: {0}")]
    Workflow(#[from] WorkflowError),
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
    #[error("{0}")]
    Usage(String),
}

/// Why a submission ended in the `Error` state.
///
/// The public [`WorkflowState`](crate::pipeline::WorkflowState) collapses all of
/// these into a single `Error`; the controller keeps the reason for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Image preparation failed: {0}")]
    PreparationFailed(CollaboratorError),
    #[error("Classification failed: {0}")]
    ClassificationFailed(CollaboratorError),
    #[error("The image does not show a recognizable meal")]
    NotFood,
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::PreparationFailed(_) => "preparation_failed",
            AnalysisError::ClassificationFailed(_) => "classification_failed",
            AnalysisError::NotFood => "not_food",
        }
    }
}

// Errors reported by the preparation and classification collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Unsupported input: {0}")]
    Unsupported(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("I/O failure: {0}")]
    Io(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Invalid model reply: {0}")]
    InvalidReply(String),
    #[error("Invalid analysis result: {0}")]
    InvalidResult(String),
}

impl From<std::io::Error> for CollaboratorError {
    fn from(error: std::io::Error) -> Self {
        CollaboratorError::Io(error.to_string())
    }
}

impl From<image::ImageError> for CollaboratorError {
    fn from(error: image::ImageError) -> Self {
        CollaboratorError::Decode(error.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Retry is only allowed from the Error state, current state is {0}")]
    RetryNotAllowed(StateKind),
    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition { from: StateKind, to: StateKind },
    #[error("The submission was cancelled")]
    Cancelled,
}
