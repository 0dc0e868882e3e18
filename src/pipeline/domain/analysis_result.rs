use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// Protein, carbohydrate and fat quantities as display strings, e.g. `"35g"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: String,
    pub carbs: String,
    pub fats: String,
}

impl Macros {
    pub fn from_grams(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein: format_grams(protein),
            carbs: format_grams(carbs),
            fats: format_grams(fats),
        }
    }

    pub fn protein_grams(&self) -> Option<f64> {
        leading_number(&self.protein)
    }

    pub fn carbs_grams(&self) -> Option<f64> {
        leading_number(&self.carbs)
    }

    pub fn fats_grams(&self) -> Option<f64> {
        leading_number(&self.fats)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Micronutrient {
    pub label: String,
    pub value: String,
    /// Share of the recommended daily intake, 0 to 100.
    pub percentage: f64,
    #[serde(alias = "daily_value")]
    pub daily_value: String,
}

/// Nutrition breakdown of a recognized meal.
///
/// Only ever built from a successful classification; see [`AnalysisResult::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub micronutrients: Vec<Micronutrient>,
    pub confidence: f64,
}

impl AnalysisResult {
    pub fn validate(&self) -> Result<(), CollaboratorError> {
        if self.food_name.trim().is_empty() {
            return Err(CollaboratorError::InvalidResult(
                "food name is empty".to_string(),
            ));
        }
        if !self.calories.is_finite() || self.calories < 0.0 {
            return Err(CollaboratorError::InvalidResult(format!(
                "calories must be non-negative, got {}",
                self.calories
            )));
        }
        let quantities = [
            ("protein", &self.macros.protein),
            ("carbs", &self.macros.carbs),
            ("fats", &self.macros.fats),
        ];
        for (name, quantity) in quantities {
            match leading_number(quantity) {
                Some(grams) if grams.is_finite() && grams >= 0.0 => {}
                _ => {
                    return Err(CollaboratorError::InvalidResult(format!(
                        "{} must be a non-negative quantity, got {:?}",
                        name, quantity
                    )));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(CollaboratorError::InvalidResult(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            )));
        }
        for nutrient in &self.micronutrients {
            if !(0.0..=100.0).contains(&nutrient.percentage) {
                return Err(CollaboratorError::InvalidResult(format!(
                    "percentage for {} must be within [0, 100], got {}",
                    nutrient.label, nutrient.percentage
                )));
            }
        }
        Ok(())
    }
}

fn format_grams(grams: f64) -> String {
    if grams.fract() == 0.0 {
        format!("{}g", grams as i64)
    } else {
        format!("{:.1}g", grams)
    }
}

fn leading_number(quantity: &str) -> Option<f64> {
    let trimmed = quantity.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
