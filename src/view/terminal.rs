use super::{Colormap, Viewer};
use crate::error::DisplayError;
use crate::heightmap::HeightGrid;
use crate::mesh::TriMesh;
use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

type Rgb = [u8; 3];

const BACKGROUND: Rgb = [24, 24, 28];
const SURFACE: [f64; 3] = [176.0, 190.0, 210.0];
const AMBIENT: f64 = 0.25;

/// Camera azimuth around +z and elevation above the xy plane, in degrees
const AZIMUTH_DEG: f64 = 35.0;
const ELEVATION_DEG: f64 = 40.0;

/// Draws previews to stdout
#[derive(Debug, Clone)]
pub struct TerminalViewer {
    /// Width of the drawing in terminal columns
    pub columns: usize,
    /// Height of the 3D drawing in terminal rows
    pub rows: usize,
}

impl Default for TerminalViewer {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 32,
        }
    }
}

impl TerminalViewer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    fn write(&self, text: &str) -> Result<(), DisplayError> {
        let stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(DisplayError::NotATerminal);
        }
        let mut lock = stdout.lock();
        lock.write_all(text.as_bytes())?;
        lock.flush()?;
        Ok(())
    }
}

impl Viewer for TerminalViewer {
    fn show_mesh(&mut self, mesh: &TriMesh) -> Result<(), DisplayError> {
        if mesh.is_empty() {
            return Err(DisplayError::EmptyMesh);
        }
        self.write(&render_mesh(mesh, self.columns, self.rows))
    }

    fn show_heights(&mut self, grid: &HeightGrid, colormap: Colormap) -> Result<(), DisplayError> {
        self.write(&render_heights(grid, colormap, self.columns))
    }
}

/// Render the height grid top-down through a colormap, with a legend line
pub fn render_heights(grid: &HeightGrid, colormap: Colormap, max_columns: usize) -> String {
    let [rows, cols] = grid.shape();
    let out_w = cols.min(max_columns.max(1));
    let out_h = ((rows as f64 * out_w as f64 / cols as f64).round() as usize).max(1);

    let (lo, hi) = grid.range().unwrap_or((0.0, 0.0));
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut pixels = Vec::with_capacity(out_w * out_h);
    for py in 0..out_h {
        let y = (py * rows / out_h).min(rows - 1);
        for px in 0..out_w {
            let x = (px * cols / out_w).min(cols - 1);
            let h = grid.get(y, x);
            pixels.push(if h.is_finite() {
                colormap.sample((h - lo) / span)
            } else {
                BACKGROUND
            });
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "Top-down 2D View (Height Map) {cols}x{rows}");
    out.push_str(&half_blocks(&pixels, out_w, out_h));

    let legend_w = out_w.clamp(2, 40);
    let _ = write!(out, "{lo:.3} ");
    for i in 0..legend_w {
        let [r, g, b] = colormap.sample(i as f64 / (legend_w - 1) as f64);
        let _ = write!(out, "\x1b[48;2;{r};{g};{b}m ");
    }
    let _ = writeln!(out, "\x1b[0m {hi:.3}");
    out
}

/// Render an orthographic, Lambert-shaded view of the mesh
pub fn render_mesh(mesh: &TriMesh, columns: usize, rows: usize) -> String {
    let (w, h) = (columns.max(1), rows.max(1) * 2);
    let pixels = rasterize(mesh, w, h);
    half_blocks(&pixels, w, h)
}

/// Project world coordinates into (right, up, depth) camera space
fn project(p: [f64; 3]) -> [f64; 3] {
    let (sa, ca) = AZIMUTH_DEG.to_radians().sin_cos();
    let (se, ce) = ELEVATION_DEG.to_radians().sin_cos();

    let x = p[0] * ca - p[1] * sa;
    let y = p[0] * sa + p[1] * ca;
    [x, p[2] * ce + y * se, y * ce - p[2] * se]
}

/// Z-buffered rasterization into a `w` by `h` pixel buffer
pub(crate) fn rasterize(mesh: &TriMesh, w: usize, h: usize) -> Vec<Rgb> {
    let mut color = vec![BACKGROUND; w * h];
    let mut depth = vec![f64::INFINITY; w * h];

    let projected: Vec<[f64; 3]> = mesh.vertices().iter().map(|&v| project(v)).collect();
    let Some(first) = projected.first() else {
        return color;
    };
    let (mut lo, mut hi) = ([first[0], first[1]], [first[0], first[1]]);
    for p in &projected {
        lo = [lo[0].min(p[0]), lo[1].min(p[1])];
        hi = [hi[0].max(p[0]), hi[1].max(p[1])];
    }
    let extent = (hi[0] - lo[0]).max(hi[1] - lo[1]).max(1e-9);
    let scale = ((w.min(h) as f64) - 1.0).max(1.0) / extent;
    let offset = [
        (w as f64 - (hi[0] - lo[0]) * scale) / 2.0,
        (h as f64 - (hi[1] - lo[1]) * scale) / 2.0,
    ];
    let to_screen = |p: [f64; 3]| {
        [
            (p[0] - lo[0]) * scale + offset[0],
            (hi[1] - p[1]) * scale + offset[1],
            p[2],
        ]
    };

    let light = normalize([-0.4, -0.6, 0.7]);

    for (&[a, b, c], n) in mesh.faces().iter().zip(mesh.face_normals()) {
        let (s0, s1, s2) = (
            to_screen(projected[a]),
            to_screen(projected[b]),
            to_screen(projected[c]),
        );
        let area = edge(s0, s1, s2);
        if area.abs() < 1e-12 {
            continue;
        }

        let diffuse = (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]).abs();
        let shade = AMBIENT + (1.0 - AMBIENT) * diffuse;
        let rgb = SURFACE.map(|c| (c * shade).round().clamp(0.0, 255.0) as u8);

        let min_x = s0[0].min(s1[0]).min(s2[0]).floor().max(0.0) as usize;
        let max_x = (s0[0].max(s1[0]).max(s2[0]).ceil() as usize).min(w - 1);
        let min_y = s0[1].min(s1[1]).min(s2[1]).floor().max(0.0) as usize;
        let max_y = (s0[1].max(s1[1]).max(s2[1]).ceil() as usize).min(h - 1);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let p = [px as f64 + 0.5, py as f64 + 0.5, 0.0];
                let w0 = edge(s1, s2, p) / area;
                let w1 = edge(s2, s0, p) / area;
                let w2 = edge(s0, s1, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * s0[2] + w1 * s1[2] + w2 * s2[2];
                let i = py * w + px;
                if z < depth[i] {
                    depth[i] = z;
                    color[i] = rgb;
                }
            }
        }
    }

    color
}

/// Signed doubled area of (a, b, p) in screen space
fn edge(a: [f64; 3], b: [f64; 3], p: [f64; 3]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Pack pixel rows in pairs into upper-half-block characters
fn half_blocks(pixels: &[Rgb], w: usize, h: usize) -> String {
    let mut out = String::new();
    for y in (0..h).step_by(2) {
        for x in 0..w {
            let [tr, tg, tb] = pixels[y * w + x];
            let [br, bg, bb] = if y + 1 < h {
                pixels[(y + 1) * w + x]
            } else {
                BACKGROUND
            };
            let _ = write!(out, "\x1b[38;2;{tr};{tg};{tb}m\x1b[48;2;{br};{bg};{bb}m\u{2580}");
        }
        out.push_str("\x1b[0m\n");
    }
    out
}
