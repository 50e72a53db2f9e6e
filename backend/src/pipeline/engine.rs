use std::fmt;
use std::path::Path;

use log::debug;
use tract_onnx::prelude::*;

use super::image::{INPUT_HEIGHT, INPUT_WIDTH};
use crate::error::PipelineError;

type OnnxPlan = TypedSimplePlan<TypedModel>;

/// Wraps the pretrained classifier, loaded once at process start and
/// read-only afterwards. `run` takes `&self`, so a single instance is safe
/// to share across workers without locking.
pub struct Engine {
    plan: OnnxPlan,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Loads and optimizes the ONNX artifact, pinning the input to one
    /// `(1, H, W, 3)` f32 batch. When the graph declares a concrete output
    /// width it is checked against the label catalog; a mismatch would
    /// silently mislabel every prediction and is fatal.
    pub fn load(model_path: &Path, expected_classes: usize) -> TractResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::NotFound(format!(
                "model artifact not found: {}",
                model_path.display()
            ))
            .into());
        }
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3),
                ),
            )?
            .into_optimized()?
            .into_runnable()?;

        match plan
            .model()
            .output_fact(0)?
            .shape
            .as_concrete()
            .and_then(|dims| dims.last().copied())
        {
            Some(width) if width != expected_classes => {
                return Err(PipelineError::ConfigurationMismatch {
                    labels: expected_classes,
                    outputs: width,
                }
                .into());
            }
            Some(width) => debug!("model output width {} matches catalog", width),
            None => debug!("model output width not declared, checked per prediction"),
        }

        Ok(Self { plan })
    }

    /// Runs one forward pass on a normalized batch and returns the
    /// per-class probability vector. The trained artifact ends in a
    /// softmax layer, so its output is forwarded as-is; an artifact
    /// exported without that final layer gets softmaxed here instead.
    pub fn predict(&self, batch: tract_ndarray::Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let input = Tensor::from(batch);
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        let scores: Vec<f32> = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| PipelineError::Inference(e.to_string()))?
            .iter()
            .copied()
            .collect();
        if scores.is_empty() {
            return Err(PipelineError::Inference(
                "model produced an empty output".to_string(),
            ));
        }
        Ok(into_distribution(scores))
    }
}

/// Forwards scores that already form a probability distribution and
/// softmaxes raw logits. Re-applying softmax to probabilities would
/// flatten them toward uniform and cap the top confidence well below 1.
fn into_distribution(scores: Vec<f32>) -> Vec<f32> {
    if is_distribution(&scores) {
        scores
    } else {
        softmax(&scores)
    }
}

fn is_distribution(scores: &[f32]) -> bool {
    let sum: f32 = scores.iter().sum();
    scores.iter().all(|&p| (0.0..=1.0).contains(&p)) && (sum - 1.0).abs() < 1e-3
}

/// Numerically stable softmax.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}
