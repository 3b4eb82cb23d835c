use super::stl::{MeshFormat, save_mesh};
use super::{Mesh, MassProperties, TriMesh, ValidationReport};
use crate::error::{ConversionError, DisplayError, ExportError};
use crate::heightmap::HeightGrid;
use crate::view::{Colormap, Viewer};
use serde::Serialize;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Extension used when the output path has none
pub const DEFAULT_EXTENSION: &str = "stl";

/// Volume and inertia of a solid together with how trustworthy they are
#[derive(Debug, Clone, Serialize)]
pub struct Description {
    pub properties: MassProperties,
    pub validation: ValidationReport,
}

/// A generated solid and the heights it came from
///
/// The validated [`TriMesh`] is built on first use and cached for the
/// lifetime of the handle.
#[derive(Debug)]
pub struct Solid {
    mesh: Mesh,
    heights: HeightGrid,
    validate_manifold: bool,
    native: OnceCell<TriMesh>,
}

impl Solid {
    pub fn new(mesh: Mesh, heights: HeightGrid) -> Self {
        Self {
            mesh,
            heights,
            validate_manifold: false,
            native: OnceCell::new(),
        }
    }

    /// Reject open or non-manifold meshes when the native mesh is built
    pub fn with_manifold_validation(mut self, enabled: bool) -> Self {
        self.validate_manifold = enabled;
        self
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.mesh.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.mesh.faces
    }

    pub fn heights(&self) -> &HeightGrid {
        &self.heights
    }

    pub fn is_built(&self) -> bool {
        self.native.get().is_some()
    }

    /// Get the native mesh, building it on first call
    pub fn get_mesh(&self) -> Result<&TriMesh, ConversionError> {
        if let Some(native) = self.native.get() {
            return Ok(native);
        }

        let native = TriMesh::from_mesh(&self.mesh)?;
        if self.validate_manifold {
            let report = native.validate();
            if !report.is_watertight() {
                return Err(ConversionError::NotWatertight {
                    boundary_edges: report.boundary_edges,
                    non_manifold_edges: report.non_manifold_edges,
                });
            }
        }

        Ok(self.native.get_or_init(|| native))
    }

    /// Save the mesh, picking the format from the path extension
    ///
    /// A path without an extension gets `.stl` appended. Returns the path
    /// actually written.
    pub fn save_as(&self, path: &Path, ascii: bool) -> Result<PathBuf, ExportError> {
        let path = if path.extension().is_none() {
            path.with_extension(DEFAULT_EXTENSION)
        } else {
            path.to_path_buf()
        };

        let format = MeshFormat::from_path(&path, ascii)?;
        save_mesh(self.get_mesh()?, &path, format)?;
        Ok(path)
    }

    /// Volume, center of mass and inertia, plus the validation report
    ///
    /// The numbers only describe a physical solid when the report says the
    /// mesh is watertight.
    pub fn describe(&self) -> Result<Description, ConversionError> {
        let native = self.get_mesh()?;
        Ok(Description {
            properties: native.mass_properties(),
            validation: native.validate(),
        })
    }

    pub fn display_3d(&self, viewer: &mut dyn Viewer) -> Result<(), DisplayError> {
        viewer.show_mesh(self.get_mesh()?)
    }

    pub fn display_2d(
        &self,
        viewer: &mut dyn Viewer,
        colormap: Colormap,
    ) -> Result<(), DisplayError> {
        viewer.show_heights(&self.heights, colormap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshBuilder, MeshOptions, WallMode, generate_mesh};
    use std::fs;
    use tempfile::tempdir;

    fn solid_from(rows: &[[f64; 3]], mode: WallMode) -> Solid {
        let grid = HeightGrid::from_rows(rows).unwrap();
        let mesh = MeshBuilder::new(MeshOptions::default().with_wall_mode(mode)).generate(&grid);
        Solid::new(mesh, grid)
    }

    #[derive(Default)]
    struct RecordingViewer {
        meshes: usize,
        heights: Vec<Colormap>,
    }

    impl Viewer for RecordingViewer {
        fn show_mesh(&mut self, _mesh: &TriMesh) -> Result<(), DisplayError> {
            self.meshes += 1;
            Ok(())
        }

        fn show_heights(
            &mut self,
            _grid: &HeightGrid,
            colormap: Colormap,
        ) -> Result<(), DisplayError> {
            self.heights.push(colormap);
            Ok(())
        }
    }

    #[test]
    fn test_mesh_is_built_once() {
        let solid = solid_from(&[[0.0; 3]; 3], WallMode::LegacyPartial);
        assert!(!solid.is_built());

        let first = solid.get_mesh().unwrap() as *const TriMesh;
        assert!(solid.is_built());
        let second = solid.get_mesh().unwrap() as *const TriMesh;
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_cell_solid() {
        let grid = HeightGrid::from_rows(&[[5.0]]).unwrap();
        let solid = Solid::new(generate_mesh(&grid, 1.0, 1.0), grid);

        let native = solid.get_mesh().unwrap();
        assert_eq!(native.vertices().len(), 2);
        assert!(native.is_empty());
    }

    #[test]
    fn test_bad_indices_fail_conversion() {
        let grid = HeightGrid::from_rows(&[[0.0]]).unwrap();
        let mesh = Mesh {
            vertices: vec![[0.0; 3]; 2],
            faces: vec![[0, 1, 2]],
        };
        let solid = Solid::new(mesh, grid);

        assert!(matches!(
            solid.get_mesh(),
            Err(ConversionError::IndexOutOfRange { index: 2, .. })
        ));
        assert!(!solid.is_built());
    }

    #[test]
    fn test_manifold_validation_rejects_legacy_walls() {
        let solid =
            solid_from(&[[1.0; 3]; 3], WallMode::LegacyPartial).with_manifold_validation(true);
        assert!(matches!(
            solid.get_mesh(),
            Err(ConversionError::NotWatertight { .. })
        ));
    }

    #[test]
    fn test_manifold_validation_accepts_full_perimeter() {
        let solid =
            solid_from(&[[1.0; 3]; 3], WallMode::FullPerimeter).with_manifold_validation(true);
        assert!(solid.get_mesh().is_ok());
    }

    #[test]
    fn test_describe_closed_slab() {
        // 2x2 cells of height 1 over a base 1 deep: a 2 x 2 x 2 block
        let solid = solid_from(&[[1.0; 3]; 3], WallMode::FullPerimeter);
        let description = solid.describe().unwrap();

        assert!(description.validation.is_watertight());
        let props = description.properties;
        assert!((props.volume - 8.0).abs() < 1e-9);
        assert!((props.center_mass[0] - 1.0).abs() < 1e-9);
        assert!((props.center_mass[1] - 1.0).abs() < 1e-9);
        assert!(props.center_mass[2].abs() < 1e-9);
        // m/12 * (b^2 + c^2) with all sides 2
        assert!((props.moment_inertia[0][0] - 8.0 / 12.0 * 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_describe_open_mesh_reports_holes() {
        let solid = solid_from(&[[1.0, 2.0, 3.0]; 3], WallMode::LegacyPartial);
        let description = solid.describe().unwrap();
        assert!(!description.validation.is_watertight());
        assert!(!description.validation.warnings.is_empty());
    }

    #[test]
    fn test_save_as_appends_extension() {
        let dir = tempdir().unwrap();
        let solid = solid_from(&[[0.0; 3]; 3], WallMode::LegacyPartial);

        let written = solid.save_as(&dir.path().join("terrain"), false).unwrap();
        assert_eq!(written, dir.path().join("terrain.stl"));

        let mut file = fs::File::open(&written).unwrap();
        let read = stl_io::read_stl(&mut file).unwrap();
        assert_eq!(read.faces.len(), solid.faces().len());
    }

    #[test]
    fn test_save_as_obj() {
        let dir = tempdir().unwrap();
        let solid = solid_from(&[[0.0; 3]; 3], WallMode::LegacyPartial);

        let written = solid.save_as(&dir.path().join("terrain.obj"), false).unwrap();
        let text = fs::read_to_string(written).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), solid.faces().len());
    }

    #[test]
    fn test_save_as_unknown_format() {
        let dir = tempdir().unwrap();
        let solid = solid_from(&[[0.0; 3]; 3], WallMode::LegacyPartial);

        let err = solid.save_as(&dir.path().join("terrain.fbx"), false).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_display_delegates_to_viewer() {
        let solid = solid_from(&[[0.0; 3]; 3], WallMode::LegacyPartial);
        let mut viewer = RecordingViewer::default();

        solid.display_3d(&mut viewer).unwrap();
        solid.display_2d(&mut viewer, Colormap::Terrain).unwrap();

        assert_eq!(viewer.meshes, 1);
        assert_eq!(viewer.heights, vec![Colormap::Terrain]);
        assert!(solid.is_built());
    }
}
