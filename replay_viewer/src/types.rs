// types.rs - Shared type definitions for grid geometry and replay state

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinate. One unit per cell; `(0, 0)` is the top-left cell.
///
/// `Display` renders the canonical `"x,y"` cell key used by the solver wire
/// schema and by the sparse cell-state map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    #[serde(alias = "X")]
    pub x: i32,
    #[serde(alias = "Y")]
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Wall flags for one cell, one boolean per edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWalls {
    #[serde(default, alias = "Top")]
    pub top: bool,
    #[serde(default, alias = "Right")]
    pub right: bool,
    #[serde(default, alias = "Bottom")]
    pub bottom: bool,
    #[serde(default, alias = "Left")]
    pub left: bool,
}

/// One cell of the static maze geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    #[serde(flatten)]
    pub at: Point,
    #[serde(default, alias = "Walls")]
    pub walls: CellWalls,
}

/// Static maze geometry for one session.
///
/// Immutable once received; a regenerated maze replaces the whole value,
/// never patches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridGeometry {
    #[serde(alias = "Rows")]
    pub rows: u32,
    #[serde(alias = "Cols")]
    pub cols: u32,
    #[serde(alias = "Cells")]
    pub cells: Vec<GridCell>,
    #[serde(alias = "Start")]
    pub start: Point,
    #[serde(alias = "End")]
    pub end: Point,
}

impl GridGeometry {
    /// Total cell count, used as the coverage denominator.
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Kind tag carried by each exploration event.
///
/// The reconstructor currently folds every kind into the visited trail; the
/// tag is preserved end-to-end so a future split by kind needs no wire change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    #[serde(alias = "VISIT", alias = "Visit")]
    Visit,
    #[serde(alias = "FRONTIER_CANDIDATE", alias = "FrontierCandidate")]
    FrontierCandidate,
    #[serde(alias = "ENQUEUE", alias = "Enqueue")]
    Enqueue,
}

/// One canonical exploration event.
///
/// `index` is the sequence position after normalization: unique, contiguous
/// from 0. Duplicate points are legal (revisits) and preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub point: Point,
    pub kind: StepKind,
}

/// Visualization state of a single cell at one playback index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Visited,
    Frontier,
    Path,
}

/// Sparse cell-state snapshot, fully recomputed on every index change.
///
/// Insertion order is first-write order, which keeps the renderer's fill
/// pass deterministic across identical reconstructions.
pub type CellStateMap = LinkedHashMap<Point, CellState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_displays_canonical_key() {
        assert_eq!(Point::new(3, 7).to_string(), "3,7");
        assert_eq!(Point::new(-1, 0).to_string(), "-1,0");
    }

    #[test]
    fn point_accepts_either_casing() {
        let lower: Point = serde_json::from_str(r#"{"x":2,"y":3}"#).unwrap();
        let upper: Point = serde_json::from_str(r#"{"X":2,"Y":3}"#).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, Point::new(2, 3));
    }

    #[test]
    fn walls_default_to_open() {
        let walls: CellWalls = serde_json::from_str(r#"{"Top":true}"#).unwrap();
        assert!(walls.top);
        assert!(!walls.right && !walls.bottom && !walls.left);
    }

    #[test]
    fn step_kind_accepts_wire_spellings() {
        for raw in ["\"visit\"", "\"VISIT\"", "\"Visit\""] {
            let kind: StepKind = serde_json::from_str(raw).unwrap();
            assert_eq!(kind, StepKind::Visit);
        }
        let kind: StepKind = serde_json::from_str("\"FRONTIER_CANDIDATE\"").unwrap();
        assert_eq!(kind, StepKind::FrontierCandidate);
    }
}
