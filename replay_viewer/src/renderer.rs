// renderer.rs - Maze renderer: cell-state fills, markers, walls
//
// Draw order is data, not call sequencing: the three passes run in the fixed
// order below, later passes occluding earlier ones. Walls are stroked last
// so state fills never cover them.

use crate::surface::{Colour, DrawingSurface};
use crate::types::{CellState, CellStateMap, GridGeometry, Point};

/// Stroke width of wall lines, in cell units.
const WALL_LINE_WIDTH: f32 = 0.08;

/// Radius of the start/end marker discs, in cell units.
const MARKER_RADIUS: f32 = 0.3;

/// Inward inset of frontier and path fills, in cell units, so both read
/// distinctly against plain visited cells.
const FRONTIER_INSET: f32 = 0.12;
const PATH_INSET: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderPass {
    CellStates,
    Markers,
    Walls,
}

const PASS_ORDER: [RenderPass; 3] = [RenderPass::CellStates, RenderPass::Markers, RenderPass::Walls];

/// Colour scheme. Defaults match the upstream frontend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub visited: Colour,
    pub frontier: Colour,
    pub path: Colour,
    pub start_tint: Colour,
    pub start_marker: Colour,
    pub end_tint: Colour,
    pub end_marker: Colour,
    pub walls: Colour,
    pub background: Colour,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            visited: Colour::rgba8(0x38, 0xbd, 0xf8, 0x4d),
            frontier: Colour::rgb8(0xff, 0xd1, 0x66),
            path: Colour::rgb8(0x00, 0xff, 0x9d),
            start_tint: Colour::rgba8(0x00, 0xff, 0x9d, 0x33),
            start_marker: Colour::rgb8(0x00, 0xff, 0x9d),
            end_tint: Colour::rgba8(0xff, 0x00, 0x55, 0x33),
            end_marker: Colour::rgb8(0xff, 0x00, 0x55),
            walls: Colour::rgb8(0x6f, 0x8c, 0xff),
            background: Colour::rgb8(0x0b, 0x0e, 0x1a),
        }
    }
}

/// Stateless renderer: geometry and cell states in, draw calls out.
#[derive(Debug, Clone, Default)]
pub struct MazeRenderer {
    theme: Theme,
}

impl MazeRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Draw one full frame. A missing geometry renders nothing at all.
    pub fn render(
        &self,
        surface: &mut dyn DrawingSurface,
        geometry: Option<&GridGeometry>,
        states: &CellStateMap,
    ) {
        let Some(geometry) = geometry else {
            return;
        };

        surface.set_space_requirements(geometry.cols, geometry.rows, WALL_LINE_WIDTH);
        surface.clear();

        for pass in PASS_ORDER {
            match pass {
                RenderPass::CellStates => self.draw_cell_states(surface, states),
                RenderPass::Markers => self.draw_markers(surface, geometry),
                RenderPass::Walls => self.draw_walls(surface, geometry),
            }
        }
    }

    /// Pass 1: sparse state fills. Untouched cells draw nothing.
    fn draw_cell_states(&self, surface: &mut dyn DrawingSurface, states: &CellStateMap) {
        for (point, state) in states.iter() {
            let (colour, inset) = match state {
                CellState::Visited => (self.theme.visited, 0.0),
                CellState::Frontier => (self.theme.frontier, FRONTIER_INSET),
                CellState::Path => (self.theme.path, PATH_INSET),
            };
            surface.set_colour(colour);
            fill_cell(surface, *point, inset);
        }
    }

    /// Pass 2: start/end tints and marker discs.
    fn draw_markers(&self, surface: &mut dyn DrawingSurface, geometry: &GridGeometry) {
        for (at, tint, marker) in [
            (geometry.start, self.theme.start_tint, self.theme.start_marker),
            (geometry.end, self.theme.end_tint, self.theme.end_marker),
        ] {
            surface.set_colour(tint);
            fill_cell(surface, at, 0.0);
            surface.set_colour(marker);
            surface.fill_segment(
                at.x as f32 + 0.5,
                at.y as f32 + 0.5,
                0.0,
                MARKER_RADIUS,
                0.0,
                std::f32::consts::TAU,
            );
        }
    }

    /// Pass 3: walls, stroked last.
    fn draw_walls(&self, surface: &mut dyn DrawingSurface, geometry: &GridGeometry) {
        surface.set_colour(self.theme.walls);
        for cell in &geometry.cells {
            let (x, y) = (cell.at.x as f32, cell.at.y as f32);
            if cell.walls.top {
                surface.line(x, y, x + 1.0, y);
            }
            if cell.walls.right {
                surface.line(x + 1.0, y, x + 1.0, y + 1.0);
            }
            if cell.walls.bottom {
                surface.line(x, y + 1.0, x + 1.0, y + 1.0);
            }
            if cell.walls.left {
                surface.line(x, y, x, y + 1.0);
            }
        }
    }
}

fn fill_cell(surface: &mut dyn DrawingSurface, at: Point, inset: f32) {
    let (x, y) = (at.x as f32, at.y as f32);
    surface.fill_polygon(&[
        (x + inset, y + inset),
        (x + 1.0 - inset, y + inset),
        (x + 1.0 - inset, y + 1.0 - inset),
        (x + inset, y + 1.0 - inset),
    ]);
}
