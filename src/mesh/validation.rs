//! Mesh validation for 3D printing
//!
//! Reports problems without changing the mesh:
//! - Degenerate faces (zero area or repeated indices)
//! - Boundary edges, i.e. holes in the surface
//! - Non-manifold edges shared by more than two faces

use serde::Serialize;
use std::collections::HashMap;

use super::trimesh::{cross, length, sub};

/// Minimum area for a non-degenerate face, in square model units
const MIN_TRIANGLE_AREA: f64 = 1e-12;

/// Result of mesh validation
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    pub faces: usize,
    pub edges: usize,
    /// Faces with zero area or a repeated vertex index
    pub degenerate: usize,
    /// Edges used by exactly one face
    pub boundary_edges: usize,
    /// Edges used by three or more faces
    pub non_manifold_edges: usize,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Every edge is used by exactly two faces
    pub fn is_watertight(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }

    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edges == 0
    }

    pub fn has_issues(&self) -> bool {
        self.degenerate > 0 || !self.is_watertight()
    }

    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} faces, watertight", self.faces)
        } else {
            format!(
                "Mesh issues: {} faces, {} degenerate, {} boundary edges, {} non-manifold edges",
                self.faces, self.degenerate, self.boundary_edges, self.non_manifold_edges
            )
        }
    }
}

/// Validate an indexed mesh whose face indices are known to be in range
pub fn validate_mesh(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> ValidationReport {
    let mut edge_use: HashMap<(usize, usize), usize> = HashMap::new();
    let mut report = ValidationReport {
        faces: faces.len(),
        ..Default::default()
    };

    for &[a, b, c] in faces {
        let repeated = a == b || b == c || c == a;
        if repeated || triangle_area(vertices[a], vertices[b], vertices[c]) < MIN_TRIANGLE_AREA {
            report.degenerate += 1;
        }
        for edge in [(a, b), (b, c), (c, a)] {
            *edge_use.entry(normalize_edge(edge)).or_default() += 1;
        }
    }

    report.edges = edge_use.len();
    report.boundary_edges = edge_use.values().filter(|&&n| n == 1).count();
    report.non_manifold_edges = edge_use.values().filter(|&&n| n > 2).count();

    if report.degenerate > 0 {
        report
            .warnings
            .push(format!("{} degenerate faces detected", report.degenerate));
    }
    if report.boundary_edges > 0 {
        report.warnings.push(format!(
            "{} boundary edges: mesh is open, volume and inertia are not meaningful",
            report.boundary_edges
        ));
    }
    if report.non_manifold_edges > 0 {
        report.warnings.push(format!(
            "{} edges are shared by more than two faces",
            report.non_manifold_edges
        ));
    }

    report
}

fn triangle_area(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> f64 {
    0.5 * length(cross(sub(v1, v0), sub(v2, v0)))
}

#[inline]
fn normalize_edge((v0, v1): (usize, usize)) -> (usize, usize) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
