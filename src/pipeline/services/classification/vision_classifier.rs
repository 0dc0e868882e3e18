use std::sync::Arc;

use crate::config::ClassifierSettings;
use crate::error::CollaboratorError;
use crate::pipeline::domain::{Classification, PreparedImage};
use crate::pipeline::orchestration::Classifier;
use crate::pipeline::services::classification::reply_parser::{NUTRITION_PROMPT, parse_reply};
use async_trait::async_trait;
use tracing::{debug, warn};

/// A multimodal model endpoint that answers a prompt about an image with text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &PreparedImage,
    ) -> Result<String, CollaboratorError>;
}

/// Classifies meals by asking a vision model, falling back through a list of
/// model names until one returns a usable reply.
pub struct VisionClassifier {
    backend: Arc<dyn VisionModel>,
    models: Vec<String>,
    prompt: String,
}

impl VisionClassifier {
    pub fn new(backend: Arc<dyn VisionModel>, settings: &ClassifierSettings) -> Self {
        Self {
            backend,
            models: settings.models.clone(),
            prompt: NUTRITION_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

#[async_trait]
impl Classifier for VisionClassifier {
    async fn classify(&self, image: &PreparedImage) -> Result<Classification, CollaboratorError> {
        let mut last_error = None;

        for model in &self.models {
            debug!("Trying vision model {}", model);
            let reply = match self.backend.generate(model, &self.prompt, image).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Vision model {} failed: {}", model, e);
                    last_error = Some(e);
                    continue;
                }
            };
            match parse_reply(&reply) {
                Ok(classification) => return Ok(classification),
                Err(e) => {
                    warn!("Vision model {} returned an unusable reply: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(CollaboratorError::Transport(message)) => CollaboratorError::Transport(format!(
                "all models failed, last error: {}",
                message
            )),
            Some(other) => other,
            None => CollaboratorError::Transport("no vision models configured".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "VisionClassifier"
    }
}
