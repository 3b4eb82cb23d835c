use super::Mesh;
use crate::error::ShapeError;
use crate::heightmap::HeightGrid;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Which side walls connect the top surface to the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WallMode {
    /// One wall per interior quad along its x-direction seam at row `y`.
    ///
    /// This leaves the outer perimeter (except the first row) and all
    /// y-direction seams open, so the result is not a closed solid.
    #[default]
    LegacyPartial,
    /// Walls around the outer grid perimeter only, giving a closed solid
    FullPerimeter,
}

/// Parameters for turning a height grid into a solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Model units per grid cell along X and Y
    pub pixel_width: f64,
    /// Depth of the base plane below z = 0
    pub thickness: f64,
    pub wall_mode: WallMode,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            thickness: 1.0,
            wall_mode: WallMode::default(),
        }
    }
}

impl MeshOptions {
    pub fn new(pixel_width: f64, thickness: f64) -> Self {
        Self {
            pixel_width,
            thickness,
            ..Default::default()
        }
    }

    pub fn with_wall_mode(mut self, wall_mode: WallMode) -> Self {
        self.wall_mode = wall_mode;
        self
    }
}

/// Index of the top vertex of cell `(y, x)` in a grid `cols` wide
#[inline]
pub fn top_index(y: usize, x: usize, cols: usize) -> usize {
    (y * cols + x) * 2
}

/// Index of the bottom vertex of cell `(y, x)` in a grid `cols` wide
#[inline]
pub fn bottom_index(y: usize, x: usize, cols: usize) -> usize {
    top_index(y, x, cols) + 1
}

/// Generates an extruded terrain solid from a height grid
///
/// Every cell emits a top vertex at its height and a bottom vertex at
/// `-thickness`, interleaved so the top of cell `(y, x)` sits at
/// `(y * W + x) * 2` and its bottom right after it. All face rules rely on
/// that layout.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    options: MeshOptions,
}

impl MeshBuilder {
    pub fn new(options: MeshOptions) -> Self {
        Self { options }
    }

    /// Build the mesh for a validated grid
    pub fn generate(&self, grid: &HeightGrid) -> Mesh {
        let vertices = self.vertices(grid);
        let [rows, cols] = grid.shape();

        let quad_count = rows.saturating_sub(1) * cols.saturating_sub(1);
        let mut candidates = Vec::with_capacity(6 * quad_count);
        top_faces(rows, cols, &mut candidates);
        bottom_faces(rows, cols, &mut candidates);
        match self.options.wall_mode {
            WallMode::LegacyPartial => seam_walls(rows, cols, &mut candidates),
            WallMode::FullPerimeter => perimeter_walls(rows, cols, &mut candidates),
        }

        Mesh {
            vertices,
            faces: dedup_faces(candidates),
        }
    }

    /// Build the mesh from a flat buffer with a dynamic shape
    ///
    /// Fails with `ShapeError::InvalidShape` unless the shape is 2D; nothing
    /// is generated in that case.
    pub fn generate_from_shape(&self, shape: &[usize], data: Vec<f64>) -> Result<Mesh, ShapeError> {
        let grid = HeightGrid::from_shape_vec(shape, data)?;
        Ok(self.generate(&grid))
    }

    fn vertices(&self, grid: &HeightGrid) -> Vec<[f64; 3]> {
        let [rows, cols] = grid.shape();
        let pw = self.options.pixel_width;
        let z_bottom = -self.options.thickness;

        let mut vertices = Vec::with_capacity(2 * rows * cols);
        for y in 0..rows {
            for x in 0..cols {
                let (px, py) = (x as f64 * pw, y as f64 * pw);
                vertices.push([px, py, grid.get(y, x)]);
                vertices.push([px, py, z_bottom]);
            }
        }
        vertices
    }
}

/// Generate a mesh with the default wall mode
pub fn generate_mesh(grid: &HeightGrid, pixel_width: f64, thickness: f64) -> Mesh {
    MeshBuilder::new(MeshOptions::new(pixel_width, thickness)).generate(grid)
}

/// Iterate the top-left corner of every interior quad, row-major
fn quads(rows: usize, cols: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..rows.saturating_sub(1)).flat_map(move |y| (0..cols.saturating_sub(1)).map(move |x| (y, x)))
}

/// Upward-facing surface, split along the top-right/bottom-left diagonal
fn top_faces(rows: usize, cols: usize, faces: &mut Vec<[usize; 3]>) {
    for (y, x) in quads(rows, cols) {
        let v0 = top_index(y, x, cols);
        let v1 = top_index(y, x + 1, cols);
        let v2 = top_index(y + 1, x, cols);
        let v3 = top_index(y + 1, x + 1, cols);

        faces.push([v0, v1, v2]);
        faces.push([v1, v3, v2]);
    }
}

/// Base plane, wound opposite to the top so normals point down
fn bottom_faces(rows: usize, cols: usize, faces: &mut Vec<[usize; 3]>) {
    for (y, x) in quads(rows, cols) {
        let v0 = bottom_index(y, x, cols);
        let v1 = bottom_index(y, x + 1, cols);
        let v2 = bottom_index(y + 1, x, cols);
        let v3 = bottom_index(y + 1, x + 1, cols);

        faces.push([v0, v2, v1]);
        faces.push([v1, v2, v3]);
    }
}

/// Walls on the x-direction seam of each interior quad's upper edge
fn seam_walls(rows: usize, cols: usize, faces: &mut Vec<[usize; 3]>) {
    for (y, x) in quads(rows, cols) {
        let left = (top_index(y, x, cols), bottom_index(y, x, cols));
        let right = (top_index(y, x + 1, cols), bottom_index(y, x + 1, cols));
        push_wall(left, right, faces);
    }
}

/// Walls around the outside of the grid
///
/// The boundary is walked so the outside is always on the right-hand side
/// of travel, which makes every wall face outward.
fn perimeter_walls(rows: usize, cols: usize, faces: &mut Vec<[usize; 3]>) {
    if rows < 2 || cols < 2 {
        return;
    }
    let pair = |y: usize, x: usize| (top_index(y, x, cols), bottom_index(y, x, cols));
    let (last_row, last_col) = (rows - 1, cols - 1);

    for x in 0..last_col {
        push_wall(pair(0, x), pair(0, x + 1), faces);
    }
    for y in 0..last_row {
        push_wall(pair(y, last_col), pair(y + 1, last_col), faces);
    }
    for x in (0..last_col).rev() {
        push_wall(pair(last_row, x + 1), pair(last_row, x), faces);
    }
    for y in (0..last_row).rev() {
        push_wall(pair(y + 1, 0), pair(y, 0), faces);
    }
}

/// Quad between two (top, bottom) vertex pairs, going from `a` to `b`
fn push_wall(a: (usize, usize), b: (usize, usize), faces: &mut Vec<[usize; 3]>) {
    let (a_top, a_bottom) = a;
    let (b_top, b_bottom) = b;

    faces.push([a_top, a_bottom, b_bottom]);
    faces.push([a_top, b_bottom, b_top]);
}

/// Collapse exact repeats of an ordered index triple
///
/// Rotations or reflections of the same triangle are kept as distinct faces.
/// The result is sorted lexicographically.
fn dedup_faces(candidates: Vec<[usize; 3]>) -> Vec<[usize; 3]> {
    candidates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid(rows: &[&[f64]]) -> HeightGrid {
        HeightGrid::from_rows(rows).unwrap()
    }

    fn ramp(rows: usize, cols: usize) -> HeightGrid {
        let data = (0..rows * cols).map(|i| (i % 7) as f64 * 0.5).collect();
        HeightGrid::from_shape_vec(&[rows, cols], data).unwrap()
    }

    #[test]
    fn test_flat_two_by_two() {
        let mesh = generate_mesh(&grid(&[&[0.0, 0.0], &[0.0, 0.0]]), 1.0, 1.0);

        assert_eq!(mesh.vertices.len(), 8);
        for (i, v) in mesh.vertices.iter().enumerate() {
            let expected_z = if i % 2 == 0 { 0.0 } else { -1.0 };
            assert_eq!(v[2], expected_z);
        }
        assert_eq!(mesh.faces.len(), 6);
    }

    #[test]
    fn test_two_by_two_faces_are_literal() {
        let mesh = generate_mesh(&grid(&[&[0.0, 0.0], &[0.0, 0.0]]), 1.0, 1.0);
        let faces: HashSet<[usize; 3]> = mesh.faces.iter().copied().collect();

        let expected: HashSet<[usize; 3]> = [
            [0, 2, 4],
            [2, 6, 4],
            [1, 5, 3],
            [3, 5, 7],
            [0, 1, 3],
            [0, 3, 2],
        ]
        .into_iter()
        .collect();
        assert_eq!(faces, expected);
    }

    #[test]
    fn test_single_cell_has_no_faces() {
        let mesh = generate_mesh(&grid(&[&[5.0]]), 1.0, 1.0);
        assert_eq!(mesh.vertices, vec![[0.0, 0.0, 5.0], [0.0, 0.0, -1.0]]);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_vertex_count_and_parity() {
        let g = ramp(4, 5);
        let mesh = generate_mesh(&g, 0.5, 2.0);

        assert_eq!(mesh.vertices.len(), 2 * 4 * 5);
        for y in 0..4 {
            for x in 0..5 {
                let top = mesh.vertices[top_index(y, x, 5)];
                let bottom = mesh.vertices[bottom_index(y, x, 5)];
                assert_eq!(top, [x as f64 * 0.5, y as f64 * 0.5, g.get(y, x)]);
                assert_eq!(bottom, [x as f64 * 0.5, y as f64 * 0.5, -2.0]);
            }
        }
    }

    #[test]
    fn test_candidate_face_count() {
        // 6 candidate faces per interior quad, none of which repeat
        let mesh = generate_mesh(&ramp(3, 4), 1.0, 1.0);
        assert_eq!(mesh.faces.len(), 6 * 2 * 3);
    }

    #[test]
    fn test_no_duplicate_faces() {
        let mesh = generate_mesh(&ramp(6, 3), 1.0, 1.0);
        let unique: HashSet<_> = mesh.faces.iter().collect();
        assert_eq!(unique.len(), mesh.faces.len());
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = generate_mesh(&ramp(5, 5), 1.0, 1.0);
        let n = mesh.vertices.len();
        assert!(mesh.faces.iter().flatten().all(|&i| i < n));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let g = ramp(5, 6);
        let a = generate_mesh(&g, 1.5, 0.25);
        let b = generate_mesh(&g, 1.5, 0.25);
        assert_eq!(a.vertices, b.vertices);
        let fa: HashSet<_> = a.faces.into_iter().collect();
        let fb: HashSet<_> = b.faces.into_iter().collect();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_pixel_width_scales_xy_only() {
        let g = ramp(3, 3);
        let unit = generate_mesh(&g, 1.0, 1.0);
        let wide = generate_mesh(&g, 2.5, 1.0);

        for (u, w) in unit.vertices.iter().zip(&wide.vertices) {
            assert_eq!(w[0], u[0] * 2.5);
            assert_eq!(w[1], u[1] * 2.5);
            assert_eq!(w[2], u[2]);
        }
        assert_eq!(unit.faces, wide.faces);
    }

    #[test]
    fn test_thickness_moves_only_bottom() {
        let g = ramp(3, 4);
        let thin = generate_mesh(&g, 1.0, 1.0);
        let thick = generate_mesh(&g, 1.0, 4.0);

        for (i, (a, b)) in thin.vertices.iter().zip(&thick.vertices).enumerate() {
            assert_eq!(a[..2], b[..2]);
            if i % 2 == 0 {
                assert_eq!(a[2], b[2]);
            } else {
                assert_eq!(b[2], -4.0);
            }
        }
        assert_eq!(thin.faces, thick.faces);
    }

    #[test]
    fn test_zero_thickness_allowed() {
        let mesh = generate_mesh(&grid(&[&[1.0, 1.0], &[1.0, 1.0]]), 1.0, 0.0);
        assert!(mesh.vertices.iter().skip(1).step_by(2).all(|v| v[2] == 0.0));
    }

    #[test]
    fn test_generate_from_shape_rejects_3d() {
        let builder = MeshBuilder::default();
        let err = builder
            .generate_from_shape(&[2, 2, 1], vec![0.0; 4])
            .unwrap_err();
        assert_eq!(
            err,
            ShapeError::InvalidShape {
                shape: vec![2, 2, 1]
            }
        );
    }

    #[test]
    fn test_generate_from_shape_rejects_1d() {
        let err = MeshBuilder::default()
            .generate_from_shape(&[4], vec![0.0; 4])
            .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidShape { .. }));
    }

    #[test]
    fn test_dedup_keeps_rotations() {
        let faces = dedup_faces(vec![[0, 1, 2], [1, 2, 0], [0, 1, 2], [2, 1, 0]]);
        assert_eq!(faces, vec![[0, 1, 2], [1, 2, 0], [2, 1, 0]]);
    }

    #[test]
    fn test_full_perimeter_face_count() {
        // top + bottom: 4 per quad; walls: 2 per boundary edge segment
        let mesh = MeshBuilder::new(MeshOptions::default().with_wall_mode(WallMode::FullPerimeter))
            .generate(&ramp(3, 4));
        let quads = 2 * 3;
        let perimeter_segments = 2 * (2 + 3);
        assert_eq!(mesh.faces.len(), 4 * quads + 2 * perimeter_segments);
    }

    #[test]
    fn test_full_perimeter_single_row_has_no_walls() {
        let mesh = MeshBuilder::new(MeshOptions::default().with_wall_mode(WallMode::FullPerimeter))
            .generate(&grid(&[&[1.0, 2.0, 3.0]]));
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_non_finite_heights_pass_through() {
        let finite = grid(&[&[0.0, 1.0, 2.0], &[3.0, 4.0, 5.0]]);
        let odd = grid(&[&[0.0, f64::NAN, 2.0], &[3.0, 4.0, f64::INFINITY]]);
        let a = generate_mesh(&finite, 1.0, 2.0);
        let b = generate_mesh(&odd, 1.0, 2.0);

        assert!(b.vertices[top_index(0, 1, 3)][2].is_nan());
        assert_eq!(b.vertices[top_index(1, 2, 3)][2], f64::INFINITY);
        assert_eq!(b.vertices[bottom_index(0, 1, 3)], [1.0, 0.0, -2.0]);
        assert_eq!(b.vertices[bottom_index(1, 2, 3)], [2.0, 1.0, -2.0]);
        assert_eq!(a.faces, b.faces);
    }

    #[test]
    fn test_wall_mode_leaves_vertices_alone() {
        let g = ramp(4, 4);
        let legacy = generate_mesh(&g, 1.0, 1.0);
        let full = MeshBuilder::new(MeshOptions::default().with_wall_mode(WallMode::FullPerimeter))
            .generate(&g);
        assert_eq!(legacy.vertices, full.vertices);
    }
}
