use super::HeightGrid;
use crate::error::LoadError;
use std::path::Path;

/// Load an image as a grayscale height grid
///
/// Each pixel is converted to 8-bit luma and divided by `normalization_scale`,
/// so with the default scale of 255 heights fall in `[0, 1]`.
///
/// # Arguments
/// * `path` - Image file (PNG, TIFF, JPEG or BMP)
/// * `normalization_scale` - Divisor applied to raw pixel intensities
pub fn load_grayscale(path: &Path, normalization_scale: f64) -> Result<HeightGrid, LoadError> {
    if !normalization_scale.is_finite() || normalization_scale <= 0.0 {
        return Err(LoadError::InvalidScale {
            scale: normalization_scale,
        });
    }
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let luma = image::open(path)
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_luma8();

    let (width, height) = luma.dimensions();
    let data = luma
        .pixels()
        .map(|p| f64::from(p.0[0]) / normalization_scale)
        .collect();

    HeightGrid::from_shape_vec(&[height as usize, width as usize], data).map_err(|_| {
        LoadError::Empty {
            path: path.to_path_buf(),
        }
    })
}
