use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use heightmap3d::config::{FileConfig, defaults};
use heightmap3d::mesh::stl::estimate_stl_size;
use heightmap3d::view::{Colormap, TerminalViewer};
use heightmap3d::{MeshOptions, WallMode, solid_from_image};

/// Turn a grayscale height map image into a 3D-printable solid
///
/// Examples:
///   # Convert an image with default settings (1 unit per pixel, 1 unit base)
///   heightmap3d --input_path terrain.png --output_path terrain.stl
///
///   # Taller relief: heights in [0, 10] over a 0.5mm pixel grid
///   heightmap3d --input_path terrain.png --output_path terrain.stl \
///       --pixel_width 0.5 --normalization_scale 25.5
///
///   # Closed solid with a mass property report
///   heightmap3d --input_path terrain.png --wall-mode full-perimeter --describe
#[derive(Parser, Debug)]
#[command(name = "heightmap3d")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches heightmap3d.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the input grayscale image
    #[arg(long = "input_path", visible_alias = "input-path")]
    input_path: Option<PathBuf>,

    /// Path to the output mesh file (.stl or .obj; defaults to {input}.stl)
    #[arg(long = "output_path", visible_alias = "output-path")]
    output_path: Option<PathBuf>,

    /// Width of each pixel in the generated 3D model [default: 1]
    #[arg(long = "pixel_width", visible_alias = "pixel-width")]
    pixel_width: Option<f64>,

    /// Thickness of the bottom plane below z = 0 [default: 1]
    #[arg(long)]
    thickness: Option<f64>,

    /// Scale factor for normalizing image pixel values [default: 255]
    #[arg(long = "normalization_scale", visible_alias = "normalization-scale")]
    normalization_scale: Option<f64>,

    /// Side walls: legacy-partial (row seams only) or full-perimeter (closed solid)
    #[arg(long, value_enum)]
    wall_mode: Option<WallMode>,

    /// Fail if the mesh is not watertight
    #[arg(long)]
    validate_manifold: bool,

    /// Write ASCII STL instead of binary
    #[arg(long)]
    ascii: bool,

    /// Print volume, center of mass and inertia
    #[arg(long)]
    describe: bool,

    /// Print the description as JSON (implies --describe)
    #[arg(long)]
    json: bool,

    /// Show a shaded 3D preview in the terminal
    #[arg(long)]
    view_3d: bool,

    /// Show the height map from above in the terminal
    #[arg(long)]
    view_2d: bool,

    /// Colormap for --view-2d
    #[arg(long, value_enum)]
    colormap: Option<Colormap>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let input_path = args
        .input_path
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.input_path.clone()));
    let output_path = args
        .output_path
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output_path.clone()));
    let pixel_width = layered(
        args.pixel_width,
        file_config.as_ref().map(|c| c.pixel_width),
        defaults::PIXEL_WIDTH,
    );
    let thickness = layered(
        args.thickness,
        file_config.as_ref().map(|c| c.thickness),
        defaults::THICKNESS,
    );
    let normalization_scale = layered(
        args.normalization_scale,
        file_config.as_ref().map(|c| c.normalization_scale),
        defaults::NORMALIZATION_SCALE,
    );
    let wall_mode = args
        .wall_mode
        .or_else(|| file_config.as_ref().map(|c| c.wall_mode))
        .unwrap_or_default();
    let colormap = args
        .colormap
        .or_else(|| file_config.as_ref().map(|c| c.colormap))
        .unwrap_or_default();
    let validate_manifold =
        args.validate_manifold || file_config.as_ref().is_some_and(|c| c.validate_manifold);
    let ascii = args.ascii || file_config.as_ref().is_some_and(|c| c.ascii);
    let verbose = args.verbose || file_config.as_ref().is_some_and(|c| c.verbose);
    let describe = args.describe || args.json;

    let Some(input_path) = input_path else {
        bail!("Must provide --input_path (or input_path in the config file)");
    };
    if !input_path.exists() {
        println!("Error: Input file '{}' does not exist.", input_path.display());
        return Ok(());
    }
    if !(pixel_width > 0.0) {
        bail!("--pixel_width must be positive, got {}", pixel_width);
    }
    if !(thickness >= 0.0) {
        bail!("--thickness must not be negative, got {}", thickness);
    }

    let output_path = output_path.unwrap_or_else(|| input_path.with_extension("stl"));

    if verbose {
        println!("Configuration:");
        println!("  Input: {}", input_path.display());
        println!("  Output: {}", output_path.display());
        println!("  Pixel width: {}", pixel_width);
        println!("  Thickness: {}", thickness);
        println!("  Normalization scale: {}", normalization_scale);
        println!("  Wall mode: {:?}", wall_mode);
        println!(
            "  Manifold validation: {}",
            if validate_manifold { "enabled" } else { "disabled" }
        );
        println!();
    }

    let spinner = create_spinner(&format!("Processing file '{}'...", input_path.display()));
    let start = Instant::now();
    let options = MeshOptions::new(pixel_width, thickness).with_wall_mode(wall_mode);
    let solid = solid_from_image(&input_path, normalization_scale, options)
        .context("Failed to build solid from input image")?
        .with_manifold_validation(validate_manifold);
    let (rows, cols) = (solid.heights().rows(), solid.heights().cols());
    spinner.finish_with_message(format!(
        "Generated {} vertices, {} faces from {}x{} pixels [{:.1}s]",
        solid.vertices().len(),
        solid.faces().len(),
        cols,
        rows,
        start.elapsed().as_secs_f32()
    ));
    if verbose && let Some((lo, hi)) = solid.heights().range() {
        println!("  Height range: {:.3} -> {:.3}", lo, hi);
    }

    let spinner = create_spinner("Writing mesh file...");
    let start = Instant::now();
    let written = solid
        .save_as(&output_path, ascii)
        .context("Failed to write mesh file")?;
    let file_size = std::fs::metadata(&written)
        .map(|m| m.len() as usize)
        .unwrap_or_else(|_| estimate_stl_size(solid.faces().len()));
    spinner.finish_with_message(format!(
        "Wrote {} triangles ({:.1} KB) [{:.1}s]",
        solid.faces().len(),
        file_size as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    ));
    println!("Model successfully saved to '{}'.", written.display());

    if describe {
        let description = solid.describe().context("Failed to describe solid")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&description)?);
        } else {
            println!();
            println!("{}", description.properties);
            if verbose {
                println!("{}", description.validation.summary());
            }
        }
        for warning in &description.validation.warnings {
            eprintln!("Warning: {}", warning);
        }
    }

    let mut viewer = TerminalViewer::default();
    if args.view_2d
        && let Err(e) = solid.display_2d(&mut viewer, colormap)
    {
        eprintln!("Failed to display the 2D view: {}", e);
    }
    if args.view_3d
        && let Err(e) = solid.display_3d(&mut viewer)
    {
        eprintln!("Failed to display the 3D model: {}", e);
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

/// A flag given on the command line wins over the config file, which wins
/// over the built-in default
fn layered<T>(flag: Option<T>, file: Option<T>, default: T) -> T {
    flag.or(file).unwrap_or(default)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
