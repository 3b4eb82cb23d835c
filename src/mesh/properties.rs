//! Mass properties of a closed triangle mesh at unit density
//!
//! Integrates over the enclosed volume with the divergence theorem, one
//! signed tetrahedron per face (Eberly, "Polyhedral Mass Properties").
//! The results only describe a physical solid when the mesh is closed and
//! consistently wound with outward normals.

use serde::Serialize;
use std::fmt;

/// Below this absolute volume the center of mass falls back to the vertex centroid
const MIN_VOLUME: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassProperties {
    /// Signed volume; positive for outward-facing normals
    pub volume: f64,
    pub center_mass: [f64; 3],
    /// Inertia tensor about the center of mass
    pub moment_inertia: [[f64; 3]; 3],
}

impl fmt::Display for MassProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [cx, cy, cz] = self.center_mass;
        writeln!(f, "Volume: {}", self.volume)?;
        writeln!(f, "Center Mass: [{cx}, {cy}, {cz}]")?;
        let rows: Vec<String> = self
            .moment_inertia
            .iter()
            .map(|r| format!("[{}, {}, {}]", r[0], r[1], r[2]))
            .collect();
        write!(f, "Inertia: [{}]", rows.join(", "))
    }
}

/// Polynomial subexpressions of one coordinate over a triangle
struct Sub {
    f1: f64,
    f2: f64,
    f3: f64,
    g: [f64; 3],
}

fn subexpressions(w0: f64, w1: f64, w2: f64) -> Sub {
    let temp0 = w0 + w1;
    let f1 = temp0 + w2;
    let temp1 = w0 * w0;
    let temp2 = temp1 + w1 * temp0;
    let f2 = temp2 + w2 * f1;
    let f3 = w0 * temp1 + w1 * temp2 + w2 * f2;
    Sub {
        f1,
        f2,
        f3,
        g: [
            f2 + w0 * (f1 + w0),
            f2 + w1 * (f1 + w1),
            f2 + w2 * (f1 + w2),
        ],
    }
}

pub(crate) fn compute(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> MassProperties {
    // 1, x, y, z, x^2, y^2, z^2, xy, yz, zx
    let mut integral = [0.0f64; 10];

    for &[a, b, c] in faces {
        let (p0, p1, p2) = (vertices[a], vertices[b], vertices[c]);
        let d = super::trimesh::cross(super::trimesh::sub(p1, p0), super::trimesh::sub(p2, p0));

        let sx = subexpressions(p0[0], p1[0], p2[0]);
        let sy = subexpressions(p0[1], p1[1], p2[1]);
        let sz = subexpressions(p0[2], p1[2], p2[2]);

        integral[0] += d[0] * sx.f1;
        integral[1] += d[0] * sx.f2;
        integral[2] += d[1] * sy.f2;
        integral[3] += d[2] * sz.f2;
        integral[4] += d[0] * sx.f3;
        integral[5] += d[1] * sy.f3;
        integral[6] += d[2] * sz.f3;
        integral[7] += d[0] * (p0[1] * sx.g[0] + p1[1] * sx.g[1] + p2[1] * sx.g[2]);
        integral[8] += d[1] * (p0[2] * sy.g[0] + p1[2] * sy.g[1] + p2[2] * sy.g[2]);
        integral[9] += d[2] * (p0[0] * sz.g[0] + p1[0] * sz.g[1] + p2[0] * sz.g[2]);
    }

    let scale = [
        1.0 / 6.0,
        1.0 / 24.0,
        1.0 / 24.0,
        1.0 / 24.0,
        1.0 / 60.0,
        1.0 / 60.0,
        1.0 / 60.0,
        1.0 / 120.0,
        1.0 / 120.0,
        1.0 / 120.0,
    ];
    for (value, s) in integral.iter_mut().zip(scale) {
        *value *= s;
    }

    let mass = integral[0];
    let cm = if mass.abs() > MIN_VOLUME {
        [integral[1] / mass, integral[2] / mass, integral[3] / mass]
    } else {
        centroid(vertices)
    };

    let xx = integral[5] + integral[6] - mass * (cm[1] * cm[1] + cm[2] * cm[2]);
    let yy = integral[4] + integral[6] - mass * (cm[2] * cm[2] + cm[0] * cm[0]);
    let zz = integral[4] + integral[5] - mass * (cm[0] * cm[0] + cm[1] * cm[1]);
    let xy = -(integral[7] - mass * cm[0] * cm[1]);
    let yz = -(integral[8] - mass * cm[1] * cm[2]);
    let xz = -(integral[9] - mass * cm[2] * cm[0]);

    MassProperties {
        volume: mass,
        center_mass: cm,
        moment_inertia: [[xx, xy, xz], [xy, yy, yz], [xz, yz, zz]],
    }
}

fn centroid(vertices: &[[f64; 3]]) -> [f64; 3] {
    if vertices.is_empty() {
        return [0.0; 3];
    }
    let n = vertices.len() as f64;
    let sum = vertices.iter().fold([0.0; 3], |acc, v| {
        [acc[0] + v[0], acc[1] + v[1], acc[2] + v[2]]
    });
    [sum[0] / n, sum[1] / n, sum[2] / n]
}
