pub mod analysis_pipeline;
pub mod collaborator;
pub mod service;

pub use analysis_pipeline::{AnalysisPipeline, AnalysisPipelineBuilder};
pub use collaborator::{Classifier, ImagePreparer};
