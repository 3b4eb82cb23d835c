//! heightmap3d - Turn grayscale height maps into 3D-printable STL solids

pub mod config;
pub mod error;
pub mod heightmap;
pub mod mesh;
pub mod view;

pub use error::{Error, Result};
pub use heightmap::HeightGrid;
pub use mesh::{Mesh, MeshBuilder, MeshOptions, Solid, WallMode};

use std::path::Path;

/// Load a grayscale image and extrude it into a solid
///
/// # Arguments
/// * `path` - Input image
/// * `normalization_scale` - Divisor applied to pixel intensities
/// * `options` - Pixel width, base thickness and wall mode
pub fn solid_from_image(
    path: &Path,
    normalization_scale: f64,
    options: MeshOptions,
) -> Result<Solid> {
    let grid = heightmap::load_grayscale(path, normalization_scale)?;
    let mesh = MeshBuilder::new(options).generate(&grid);
    Ok(Solid::new(mesh, grid))
}
