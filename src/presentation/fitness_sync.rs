use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::pipeline::AnalysisResult;

pub const FITNESS_PLATFORM: &str = "Fitness API (v1)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncMetrics {
    pub calories_burned: f64,
    pub calories_consumed: f64,
    pub protein_g: f64,
}

/// Meal record pushed to a health platform after a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessSyncPayload {
    pub platform: String,
    pub user_id: String,
    pub metrics: SyncMetrics,
    pub timestamp: String,
}

impl FitnessSyncPayload {
    pub fn for_meal(user_id: impl Into<String>, result: &AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            platform: FITNESS_PLATFORM.to_string(),
            user_id: user_id.into(),
            metrics: SyncMetrics {
                calories_burned: 0.0,
                calories_consumed: result.calories,
                protein_g: result.macros.protein_grams().unwrap_or(0.0),
            },
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::SampleClassifier;
    use chrono::TimeZone;

    #[test]
    fn builds_payload_from_meal() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 30, 0).unwrap();
        let payload =
            FitnessSyncPayload::for_meal("demo_user", &SampleClassifier::sample_meal(), now);

        assert_eq!(payload.platform, "Fitness API (v1)");
        assert_eq!(payload.metrics.calories_consumed, 450.0);
        assert_eq!(payload.metrics.protein_g, 35.0);
        assert_eq!(payload.metrics.calories_burned, 0.0);
        assert_eq!(payload.timestamp, "2026-03-14T12:30:00Z");

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["user_id"], "demo_user");
        assert_eq!(json["metrics"]["protein_g"], 35.0);
    }
}
