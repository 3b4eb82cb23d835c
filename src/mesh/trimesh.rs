use super::Mesh;
use super::properties::{self, MassProperties};
use super::validation::{self, ValidationReport};
use crate::error::ConversionError;

/// A triangle with its vertices resolved and its normal precomputed
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [[f64; 3]; 3],
    pub normal: [f64; 3],
}

impl Triangle {
    /// Create a new triangle and calculate its normal
    pub fn new(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normal: calculate_normal(v0, v1, v2),
        }
    }

    /// Area of the triangle
    pub fn area(&self) -> f64 {
        0.5 * length(cross_edges(self.vertices[0], self.vertices[1], self.vertices[2]))
    }
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub(crate) fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn cross_edges(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
    cross(sub(v1, v0), sub(v2, v0))
}

/// Unit normal by the right-hand rule, or zero for a degenerate triangle
fn calculate_normal(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
    let n = cross_edges(v0, v1, v2);
    let len = length(n);
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Validated triangle mesh used for export, inspection and display
///
/// Construction checks that every face index is in range and that every
/// vertex is finite; after that all queries are infallible.
///
/// This is stricter than [`MeshBuilder`](super::MeshBuilder), which copies
/// NaN and infinite heights into its vertices unchanged. Such a mesh can be
/// generated but not converted.
#[derive(Debug, Clone)]
pub struct TriMesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
    normals: Vec<[f64; 3]>,
}

impl TriMesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<Self, ConversionError> {
        if let Some((index, position)) = vertices
            .iter()
            .enumerate()
            .find(|(_, v)| v.iter().any(|c| !c.is_finite()))
        {
            return Err(ConversionError::NonFiniteVertex {
                index,
                position: *position,
            });
        }

        let vertex_count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(ConversionError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        let normals = faces
            .iter()
            .map(|&[a, b, c]| calculate_normal(vertices[a], vertices[b], vertices[c]))
            .collect();

        Ok(Self {
            vertices,
            faces,
            normals,
        })
    }

    pub fn from_mesh(mesh: &Mesh) -> Result<Self, ConversionError> {
        Self::new(mesh.vertices.clone(), mesh.faces.clone())
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn face_normals(&self) -> &[[f64; 3]] {
        &self.normals
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Resolved triangles in face order
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        self.faces
            .iter()
            .zip(&self.normals)
            .map(|(&[a, b, c], &normal)| Triangle {
                vertices: [self.vertices[a], self.vertices[b], self.vertices[c]],
                normal,
            })
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for a mesh with no vertices
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                [lo[0].min(v[0]), lo[1].min(v[1]), lo[2].min(v[2])],
                [hi[0].max(v[0]), hi[1].max(v[1]), hi[2].max(v[2])],
            )
        }))
    }

    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Volume, center of mass and inertia at unit density
    ///
    /// Only meaningful for a closed, consistently wound mesh.
    pub fn mass_properties(&self) -> MassProperties {
        properties::compute(&self.vertices, &self.faces)
    }

    pub fn validate(&self) -> ValidationReport {
        validation::validate_mesh(&self.vertices, &self.faces)
    }

    pub fn is_watertight(&self) -> bool {
        self.validate().is_watertight()
    }
}
