pub mod builder;
pub mod properties;
pub mod solid;
pub mod stl;
pub mod trimesh;
pub mod validation;

pub use builder::{MeshBuilder, MeshOptions, WallMode, generate_mesh};
pub use properties::MassProperties;
pub use solid::{Description, Solid};
pub use stl::{MeshFormat, save_mesh};
pub use trimesh::{TriMesh, Triangle};
pub use validation::{ValidationReport, validate_mesh};

/// Indexed triangle mesh produced from a height grid
///
/// `vertices` keeps the top/bottom pair layout of the generator. `faces`
/// holds unique index triples; callers must not rely on their order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
}

