//! Previews of the generated solid
//!
//! The [`Viewer`] trait is the seam between [`Solid`](crate::mesh::Solid)
//! and whatever draws it. [`TerminalViewer`] draws into an ANSI truecolor
//! terminal using half-block characters, two pixels per cell.

pub mod colormap;
pub mod terminal;

pub use colormap::Colormap;
pub use terminal::{TerminalViewer, render_heights, render_mesh};

use crate::error::DisplayError;
use crate::heightmap::HeightGrid;
use crate::mesh::TriMesh;

pub trait Viewer {
    /// Show a shaded 3D view of the mesh
    fn show_mesh(&mut self, mesh: &TriMesh) -> Result<(), DisplayError>;

    /// Show the height grid from above, row 0 at the top
    fn show_heights(&mut self, grid: &HeightGrid, colormap: Colormap) -> Result<(), DisplayError>;
}
