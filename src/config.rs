use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

use crate::error::AppError;

const ENV_PREFIX: &str = "NUTRISNAP";
pub const DEFAULT_CONFIG_FILE: &str = "nutrisnap";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    pub user_id: String,
    pub workflow: WorkflowSettings,
    pub preparation: PreparationSettings,
    pub classifier: ClassifierSettings,
}

/// Timeouts are in milliseconds; `0` disables the timeout for that phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub preparation_timeout_ms: u64,
    pub classification_timeout_ms: u64,
    pub event_buffer_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreparationSettings {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOutcome {
    Food,
    NotFood,
    Failure,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Vision models tried in order until one produces a usable reply
    pub models: Vec<String>,
    pub sample_outcome: SampleOutcome,
    pub sample_delay_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            user_id: "demo_user".to_string(),
            workflow: WorkflowSettings::default(),
            preparation: PreparationSettings::default(),
            classifier: ClassifierSettings::default(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            preparation_timeout_ms: 10_000,
            classification_timeout_ms: 30_000,
            event_buffer_size: 16,
        }
    }
}

impl Default for PreparationSettings {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 85,
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            models: vec![
                "gemini-2.0-flash-exp".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
            ],
            sample_outcome: SampleOutcome::Food,
            sample_delay_ms: 2_000,
        }
    }
}

impl WorkflowSettings {
    pub fn preparation_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.preparation_timeout_ms)
    }

    pub fn classification_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.classification_timeout_ms)
    }
}

fn non_zero_millis(millis: u64) -> Option<Duration> {
    (millis > 0).then(|| Duration::from_millis(millis))
}

impl Configuration {
    /// Layers an optional config file (any format the `config` crate knows,
    /// extension optional) under `NUTRISNAP__*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_bound_both_phases() {
        let configuration = Configuration::default();
        assert_eq!(
            configuration.workflow.preparation_timeout(),
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            configuration.workflow.classification_timeout(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(configuration.classifier.models.len(), 3);
        assert_eq!(configuration.log_level(), Level::INFO);
    }

    #[test]
    fn zero_disables_a_timeout() {
        let settings = WorkflowSettings {
            preparation_timeout_ms: 0,
            ..WorkflowSettings::default()
        };
        assert_eq!(settings.preparation_timeout(), None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let configuration = Configuration::load("does/not/exist/nutrisnap").unwrap();
        assert_eq!(configuration.user_id, "demo_user");
        assert_eq!(configuration.preparation.max_dimension, 1024);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = std::env::temp_dir().join(format!("nutrisnap-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n[workflow]\nclassification_timeout_ms = 500\n[classifier]\nsample_outcome = \"not_food\""
        )
        .unwrap();

        let configuration = Configuration::load(&path).unwrap();
        assert_eq!(configuration.log_level(), Level::DEBUG);
        assert_eq!(
            configuration.workflow.classification_timeout(),
            Some(Duration::from_millis(500))
        );
        assert_eq!(configuration.workflow.preparation_timeout_ms, 10_000);
        assert_eq!(configuration.classifier.sample_outcome, SampleOutcome::NotFood);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
