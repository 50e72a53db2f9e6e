use std::path::Path;

use image::{ImageReader, RgbImage, imageops::FilterType};
use tract_onnx::prelude::tract_ndarray::Array4;

use crate::error::PipelineError;

/// Resolution the model was trained on.
pub const INPUT_WIDTH: u32 = 128;
pub const INPUT_HEIGHT: u32 = 128;

// Nearest-neighbour resampling, matching the resize applied to the
// training data. Changing the filter shifts pixel statistics enough to
// degrade predictions.
const RESIZE_FILTER: FilterType = FilterType::Nearest;

/// Decodes an image file and resizes it to the model's input resolution.
pub fn load_image(path: &Path) -> Result<RgbImage, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::NotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let decoded = ImageReader::open(path)
        .map_err(|e| PipelineError::NotFound(format!("cannot open {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| PipelineError::UnsupportedFormat(e.to_string()))?
        .decode()
        .map_err(|e| PipelineError::UnsupportedFormat(e.to_string()))?;
    Ok(image::imageops::resize(
        &decoded.to_rgb8(),
        INPUT_WIDTH,
        INPUT_HEIGHT,
        RESIZE_FILTER,
    ))
}

/// Rescales pixel intensities into [0,1] and prepends the batch axis,
/// producing the `(1, H, W, 3)` batch the model expects. The image must
/// already be at the model's input resolution, as [`load_image`]
/// guarantees; anything else is a caller bug.
pub fn normalize(img: &RgbImage) -> Array4<f32> {
    assert_eq!(
        img.dimensions(),
        (INPUT_WIDTH, INPUT_HEIGHT),
        "normalize requires a {INPUT_WIDTH}x{INPUT_HEIGHT} image"
    );
    Array4::from_shape_fn(
        (1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3),
        |(_, y, x, c)| img[(x as u32, y as u32)][c] as f32 / 255.0,
    )
}
