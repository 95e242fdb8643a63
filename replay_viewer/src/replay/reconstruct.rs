// replay/reconstruct.rs - Pure point-in-time state reconstruction
//
// The whole replay design hangs on this function being stateless: every
// index change recomputes the full snapshot from the event log, so there is
// no incremental patching and no undo logic anywhere in the viewer.

use crate::types::{CellState, CellStateMap, Point, StepRecord};

/// Rebuild the cell-state snapshot visible at playback position `index`.
///
/// Write order is the correctness contract:
/// 1. every step before `index` marks its cell `Visited` (last write wins,
///    which handles revisits),
/// 2. the most recently processed cell is overwritten to `Frontier`,
/// 3. once `index` reaches or passes the end of the log, every solution-path
///    cell is overwritten to `Path`, superseding both earlier states.
///
/// Deterministic and idempotent: identical arguments always produce an
/// identical map, regardless of any calls made in between.
pub fn reconstruct(steps: &[StepRecord], final_path: &[Point], index: usize) -> CellStateMap {
    let mut map = CellStateMap::new();
    let limit = index.min(steps.len());

    for step in &steps[..limit] {
        map.insert(step.point, CellState::Visited);
    }

    if limit > 0 {
        map.insert(steps[limit - 1].point, CellState::Frontier);
    }

    if index >= steps.len() && !final_path.is_empty() {
        for point in final_path {
            map.insert(*point, CellState::Path);
        }
    }

    map
}
