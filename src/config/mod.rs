use serde::Deserialize;
use std::path::PathBuf;

use crate::mesh::WallMode;
use crate::view::Colormap;

/// Defaults shared by the CLI and the config file
pub mod defaults {
    pub const PIXEL_WIDTH: f64 = 1.0;
    pub const THICKNESS: f64 = 1.0;
    /// Divisor turning 8-bit intensities into heights in `[0, 1]`
    pub const NORMALIZATION_SCALE: f64 = 255.0;
}

fn default_pixel_width() -> f64 {
    defaults::PIXEL_WIDTH
}
fn default_thickness() -> f64 {
    defaults::THICKNESS
}
fn default_normalization_scale() -> f64 {
    defaults::NORMALIZATION_SCALE
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_pixel_width")]
    pub pixel_width: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default = "default_normalization_scale")]
    pub normalization_scale: f64,
    #[serde(default)]
    pub wall_mode: WallMode,
    #[serde(default)]
    pub validate_manifold: bool,
    #[serde(default)]
    pub ascii: bool,
    #[serde(default)]
    pub colormap: Colormap,
    #[serde(default)]
    pub verbose: bool,
}

impl FileConfig {
    /// Load the first config file found in the search paths
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("heightmap3d.toml"));
    paths.push(PathBuf::from(".heightmap3d.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("heightmap3d").join("config.toml"));
        paths.push(config_dir.join("heightmap3d.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".heightmap3d.toml"));
    }

    paths
}
