use serde_json::{Map, Value};

use crate::error::CollaboratorError;
use crate::pipeline::domain::{AnalysisResult, Classification, Macros, Micronutrient};

pub const NUTRITION_PROMPT: &str = r#"
You are an expert Nutritionist AI. Analyse the image provided and:
1. Identify the food item(s).
2. Estimate the serving size.
3. Provide an estimation of the nutritional content (Calories, Protein, Carbs, Fats) for that portion.
4. Return ONLY a valid JSON object in the following format, no markdown formatting:
{
    "food_name": "Name of food",
    "calories": 100,
    "protein_g": 10.5,
    "carbs_g": 20.0,
    "fats_g": 5.0,
    "confidence": 0.95
}
If the image is not food, return { "error": "Not food detected" }.
"#;

const REQUIRED_KEYS: [&str; 6] = [
    "food_name",
    "calories",
    "protein_g",
    "carbs_g",
    "fats_g",
    "confidence",
];

/// Turns a vision model's text reply into a classification verdict.
///
/// Accepts the flat `food_name`/`protein_g` shape the prompt asks for as well as
/// a full camelCase [`AnalysisResult`]. Markdown code fences are ignored.
pub fn parse_reply(reply: &str) -> Result<Classification, CollaboratorError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let value: Value = serde_json::from_str(cleaned.trim())
        .map_err(|e| CollaboratorError::InvalidReply(format!("not JSON: {}", e)))?;
    let Value::Object(fields) = value else {
        return Err(CollaboratorError::InvalidReply(
            "expected a JSON object".to_string(),
        ));
    };

    if let Some(error) = fields.get("error") {
        let message = error.as_str().unwrap_or_default();
        if message.to_lowercase().contains("not food") {
            return Ok(Classification::NotFood);
        }
        return Err(CollaboratorError::InvalidReply(format!(
            "model reported an error: {}",
            error
        )));
    }

    let is_food = fields.get("isFood").or_else(|| fields.get("is_food"));
    if let Some(Value::Bool(false)) = is_food {
        return Ok(Classification::NotFood);
    }

    if fields.contains_key("foodName") {
        let result: AnalysisResult = serde_json::from_value(Value::Object(fields))
            .map_err(|e| CollaboratorError::InvalidReply(e.to_string()))?;
        return Ok(Classification::Food(result));
    }

    parse_flat(&fields).map(Classification::Food)
}

fn parse_flat(fields: &Map<String, Value>) -> Result<AnalysisResult, CollaboratorError> {
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !fields.contains_key(**key)) {
        return Err(CollaboratorError::InvalidReply(format!(
            "missing key in response: {}",
            missing
        )));
    }

    let food_name = match &fields["food_name"] {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    };
    let micronutrients = match fields.get("micronutrients") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value::<Vec<Micronutrient>>(value.clone())
            .map_err(|e| CollaboratorError::InvalidReply(format!("micronutrients: {}", e)))?,
    };

    Ok(AnalysisResult {
        food_name,
        calories: number(fields, "calories")?.trunc(),
        macros: Macros::from_grams(
            number(fields, "protein_g")?,
            number(fields, "carbs_g")?,
            number(fields, "fats_g")?,
        ),
        micronutrients,
        confidence: number(fields, "confidence")?,
    })
}

fn number(fields: &Map<String, Value>, key: &str) -> Result<f64, CollaboratorError> {
    let coerced = match &fields[key] {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    coerced
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| {
            CollaboratorError::InvalidReply(format!(
                "type coercion failed for {}: {}",
                key, fields[key]
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_flat_backend_shape() {
        let reply = r#"{"food_name": "Pad Thai", "calories": 612.9, "protein_g": 24, "carbs_g": "80.5", "fats_g": 21.0, "confidence": 0.9}"#;
        let Classification::Food(result) = parse_reply(reply).unwrap() else {
            panic!("expected food");
        };
        assert_eq!(result.food_name, "Pad Thai");
        assert_eq!(result.calories, 612.0);
        assert_eq!(result.macros.protein, "24g");
        assert_eq!(result.macros.carbs, "80.5g");
        assert_eq!(result.macros.fats, "21g");
        assert_eq!(result.confidence, 0.9);
        assert!(result.micronutrients.is_empty());
    }

    #[test]
    fn strips_markdown_fences() {
        let reply = "```json\n{\"food_name\": \"Apple\", \"calories\": 95, \"protein_g\": 0.5, \"carbs_g\": 25, \"fats_g\": 0.3, \"confidence\": 0.99}\n```";
        assert!(parse_reply(reply).unwrap().is_food());
    }

    #[test]
    fn not_food_verdicts() {
        assert_eq!(
            parse_reply(r#"{ "error": "Not food detected" }"#).unwrap(),
            Classification::NotFood
        );
        assert_eq!(
            parse_reply(r#"{ "isFood": false }"#).unwrap(),
            Classification::NotFood
        );
    }

    #[test]
    fn other_model_errors_are_failures() {
        let error = parse_reply(r#"{ "error": "quota exceeded" }"#).unwrap_err();
        assert!(matches!(error, CollaboratorError::InvalidReply(_)));
    }

    #[test]
    fn reports_the_missing_key() {
        let error = parse_reply(r#"{"food_name": "Soup", "calories": 100}"#).unwrap_err();
        assert_eq!(
            error,
            CollaboratorError::InvalidReply("missing key in response: protein_g".to_string())
        );
    }

    #[test]
    fn rejects_values_that_cannot_be_coerced() {
        let reply = r#"{"food_name": "Soup", "calories": "lots", "protein_g": 1, "carbs_g": 1, "fats_g": 1, "confidence": 0.5}"#;
        let error = parse_reply(reply).unwrap_err();
        assert!(matches!(error, CollaboratorError::InvalidReply(message) if message.contains("calories")));
    }

    #[test]
    fn rejects_non_finite_and_negative_quantities() {
        let reply = r#"{"food_name": "Soup", "calories": 100, "protein_g": "NaN", "carbs_g": 1, "fats_g": 1, "confidence": 0.5}"#;
        let error = parse_reply(reply).unwrap_err();
        assert!(matches!(error, CollaboratorError::InvalidReply(message) if message.contains("protein_g")));

        let reply = r#"{"food_name": "Soup", "calories": 100, "protein_g": 1, "carbs_g": "inf", "fats_g": 1, "confidence": 0.5}"#;
        let error = parse_reply(reply).unwrap_err();
        assert!(matches!(error, CollaboratorError::InvalidReply(message) if message.contains("carbs_g")));

        let reply = r#"{"food_name": "Soup", "calories": 100, "protein_g": 1, "carbs_g": 1, "fats_g": -5, "confidence": 0.5}"#;
        let error = parse_reply(reply).unwrap_err();
        assert!(matches!(error, CollaboratorError::InvalidReply(message) if message.contains("fats_g")));
    }

    #[test]
    fn accepts_the_presentation_shape() {
        let reply = r#"{
            "foodName": "Grilled Salmon Salad",
            "calories": 450,
            "macros": { "protein": "35g", "carbs": "12g", "fats": "22g" },
            "micronutrients": [
                { "label": "Fiber", "value": "6g", "percentage": 24, "dailyValue": "24%" }
            ],
            "confidence": 0.98
        }"#;
        let Classification::Food(result) = parse_reply(reply).unwrap() else {
            panic!("expected food");
        };
        assert_eq!(result.micronutrients[0].daily_value, "24%");
        assert_eq!(result.macros.fats, "22g");
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(parse_reply("I think this is a sandwich").is_err());
        assert!(parse_reply("[1, 2, 3]").is_err());
    }
}
