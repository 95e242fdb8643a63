// metrics.rs - Derived performance metrics for the metrics panel

use serde::Serialize;

/// Percentage of the grid explored after `index` steps.
///
/// Defined as 0 (never NaN or infinite) for an empty grid.
#[inline]
pub fn coverage(index: usize, grid_size: usize) -> f64 {
    if grid_size == 0 {
        0.0
    } else {
        index as f64 / grid_size as f64 * 100.0
    }
}

/// Ratio of solution-path length to cells explored so far.
///
/// Defined as 0 (never NaN or infinite) before the first step.
#[inline]
pub fn efficiency(index: usize, path_len: usize) -> f64 {
    if index == 0 {
        0.0
    } else {
        path_len as f64 / index as f64
    }
}

/// Display values for one playback position.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub algorithm: String,
    pub steps_explored: usize,
    pub path_length: usize,
    pub coverage_pct: f64,
    pub efficiency: f64,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl MetricsReport {
    /// Build the report for playback position `index`. Complexity labels
    /// fall back to the graph-search defaults when the solver supplies none.
    pub fn at(
        index: usize,
        path_len: usize,
        grid_size: usize,
        algorithm: Option<&str>,
        time_complexity: Option<&str>,
        space_complexity: Option<&str>,
    ) -> Self {
        Self {
            algorithm: algorithm.unwrap_or("unknown").to_string(),
            steps_explored: index,
            path_length: path_len,
            coverage_pct: coverage(index, grid_size),
            efficiency: efficiency(index, path_len),
            time_complexity: time_complexity.unwrap_or("O(V + E)").to_string(),
            space_complexity: space_complexity.unwrap_or("O(V)").to_string(),
        }
    }
}
