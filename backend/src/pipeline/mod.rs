pub mod engine;
pub mod formatter;
pub mod image;
pub mod labels;

use std::path::Path;

use shared::PredictionResponse;

use crate::error::PipelineError;
use engine::Engine;
use labels::LabelCatalog;

/// The inference pipeline contract shared by every delivery surface:
/// load → normalize → predict → format.
pub fn classify_file(
    engine: &Engine,
    catalog: &LabelCatalog,
    path: &Path,
) -> Result<PredictionResponse, PipelineError> {
    let img = image::load_image(path)?;
    let batch = image::normalize(&img);
    let probabilities = engine.predict(batch)?;
    formatter::format_prediction(catalog, &probabilities)
}
