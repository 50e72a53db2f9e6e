use std::collections::BTreeMap;

use shared::PredictionResponse;

use super::labels::LabelCatalog;
use crate::error::PipelineError;

/// Combines the label catalog with a probability vector into the result
/// every surface returns: top class, its confidence and the full map.
/// The two must be equal length; anything else means catalog and artifact
/// are out of sync.
pub fn format_prediction(
    catalog: &LabelCatalog,
    probabilities: &[f32],
) -> Result<PredictionResponse, PipelineError> {
    if catalog.len() != probabilities.len() || probabilities.is_empty() {
        return Err(PipelineError::ConfigurationMismatch {
            labels: catalog.len(),
            outputs: probabilities.len(),
        });
    }

    // stable argmax: strict comparison keeps the first index on ties
    let mut best = 0;
    for (i, &p) in probabilities.iter().enumerate().skip(1) {
        if p > probabilities[best] {
            best = i;
        }
    }

    let class_confidences: BTreeMap<String, f32> = catalog
        .labels()
        .iter()
        .cloned()
        .zip(probabilities.iter().copied())
        .collect();

    Ok(PredictionResponse {
        class: catalog.labels()[best].clone(),
        confidence: probabilities[best],
        class_confidences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_argmax_label() {
        let catalog = LabelCatalog::builtin();
        let result = format_prediction(&catalog, &[0.05, 0.1, 0.8, 0.05]).unwrap();
        assert_eq!(result.class, "notumor");
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn first_index_wins_ties() {
        let catalog = LabelCatalog::builtin();
        let result = format_prediction(&catalog, &[0.4, 0.4, 0.1, 0.1]).unwrap();
        assert_eq!(result.class, "glioma");
    }

    #[test]
    fn map_covers_every_label() {
        let catalog = LabelCatalog::builtin();
        let result = format_prediction(&catalog, &[0.7, 0.1, 0.1, 0.1]).unwrap();
        assert_eq!(result.class_confidences.len(), 4);
        for label in catalog.labels() {
            assert!(result.class_confidences.contains_key(label));
        }
        let sum: f32 = result.class_confidences.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn length_mismatch_is_a_configuration_error() {
        let catalog = LabelCatalog::builtin();
        let err = format_prediction(&catalog, &[0.5, 0.5]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ConfigurationMismatch {
                labels: 4,
                outputs: 2
            }
        ));
    }

    #[test]
    fn empty_vector_is_rejected() {
        let catalog = LabelCatalog::builtin();
        assert!(format_prediction(&catalog, &[]).is_err());
    }
}
