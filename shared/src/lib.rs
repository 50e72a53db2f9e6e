use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Predictions at or above this confidence are rendered as confident by
/// the delivery surfaces; below it they are flagged as uncertain.
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Result of classifying a single MRI scan.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub class: String,
    pub confidence: f32,
    pub class_confidences: BTreeMap<String, f32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// Per-class sample counts, keyed by class name.
pub type ClassDistribution = BTreeMap<String, u32>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccuracyReport {
    pub overall_accuracy: f32,
    pub class_accuracy: BTreeMap<String, f32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_response_json_field_names() {
        let response = PredictionResponse {
            class: "glioma".into(),
            confidence: 0.91,
            class_confidences: BTreeMap::from([
                ("glioma".to_string(), 0.91),
                ("meningioma".to_string(), 0.04),
                ("notumor".to_string(), 0.03),
                ("pituitary".to_string(), 0.02),
            ]),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["class"], "glioma");
        assert!(json["class_confidences"]["meningioma"].is_number());

        let back: PredictionResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }
}
