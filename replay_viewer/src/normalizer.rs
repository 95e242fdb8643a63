// normalizer.rs - Canonicalizes the solver's heterogeneously-cased event log
//
// The producing service emits the same semantic fields under either
// lower-camel or upper-camel names, and occasionally ships records with
// missing or garbled coordinates. Everything downstream of this module sees
// only canonical, contiguously indexed StepRecords.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{Point, StepKind, StepRecord};

/// Raw step/path section of a solver payload. Individual records stay as
/// untyped JSON so one malformed record can be dropped without failing the
/// whole run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunPayload {
    #[serde(default, rename = "steps", alias = "Steps")]
    pub steps: Vec<Value>,
    #[serde(
        default,
        rename = "finalPath",
        alias = "FinalPath",
        alias = "path",
        alias = "Path",
        alias = "solutionPath",
        alias = "SolutionPath"
    )]
    pub final_path: Vec<Value>,
}

/// Canonical output of normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRun {
    pub steps: Vec<StepRecord>,
    pub final_path: Vec<Point>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawStep {
    #[serde(default, rename = "step", alias = "Step", alias = "index", alias = "Index")]
    step: Option<i64>,
    #[serde(default, rename = "point", alias = "Point")]
    point: Option<RawPoint>,
    #[serde(default, rename = "kind", alias = "Kind", alias = "type", alias = "Type")]
    kind: Option<StepKind>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPoint {
    #[serde(default, alias = "X")]
    x: Option<i32>,
    #[serde(default, alias = "Y")]
    y: Option<i32>,
}

impl RawPoint {
    fn resolve(self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

/// Normalize a raw run payload into a sorted, contiguously indexed event log
/// and a canonical solution path.
///
/// Steps are stably sorted by their wire sequence index (ties keep original
/// array order), then re-indexed from 0 so `StepRecord::index` is always a
/// sequence position. Records without a usable sequence index or coordinate
/// pair are dropped with a warning. Pure: no I/O, no shared state.
pub fn normalize(payload: &RunPayload) -> NormalizedRun {
    let mut keyed: Vec<(i64, Point, StepKind)> = Vec::with_capacity(payload.steps.len());
    for (pos, raw) in payload.steps.iter().enumerate() {
        match serde_json::from_value::<RawStep>(raw.clone()) {
            Ok(step) => {
                let sequence = step.step;
                let point = step.point.and_then(RawPoint::resolve);
                match (sequence, point) {
                    (Some(sequence), Some(point)) => {
                        keyed.push((sequence, point, step.kind.unwrap_or_default()));
                    }
                    _ => warn!("dropping step record {pos}: missing sequence index or coordinates"),
                }
            }
            Err(err) => warn!("dropping unreadable step record {pos}: {err}"),
        }
    }

    // Stable sort: equal wire indices keep their original array order.
    keyed.sort_by_key(|&(sequence, _, _)| sequence);

    let steps = keyed
        .into_iter()
        .enumerate()
        .map(|(index, (_, point, kind))| StepRecord { index, point, kind })
        .collect();

    let final_path = payload
        .final_path
        .iter()
        .enumerate()
        .filter_map(|(pos, raw)| {
            match serde_json::from_value::<RawPoint>(raw.clone()).ok().and_then(RawPoint::resolve) {
                Some(point) => Some(point),
                None => {
                    warn!("dropping path record {pos}: missing coordinates");
                    None
                }
            }
        })
        .collect();

    NormalizedRun { steps, final_path }
}
