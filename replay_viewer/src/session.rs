// session.rs - Session ingestion and the viewer that owns one session at a time
//
// A session is one atomic bundle of grid geometry, event log, and solution
// path. Replacing it follows a strict order: cancel the in-flight frame,
// dispose the old surface, then install the replacement. Nothing from an old
// session survives into the next one.

use log::info;
use serde::Deserialize;
use uuid::Uuid;

use crate::error_handling::{Result, ViewerError};
use crate::metrics::MetricsReport;
use crate::normalizer::{normalize, RunPayload};
use crate::renderer::{MazeRenderer, Theme};
use crate::replay::{
    reconstruct, FrameHandle, FrameOutcome, FrameScheduler, PlaybackController, PlaybackPhase,
};
use crate::surface::DrawingSurface;
use crate::types::{CellStateMap, GridGeometry, Point, StepRecord};

/// Descriptor of the algorithm that produced the run, as shipped by the
/// solver. Everything optional; the metrics panel falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlgorithmInfo {
    #[serde(default, rename = "name", alias = "Name")]
    pub name: Option<String>,
    #[serde(default, rename = "timeComplexity", alias = "TimeComplexity")]
    pub time_complexity: Option<String>,
    #[serde(default, rename = "spaceComplexity", alias = "SpaceComplexity")]
    pub space_complexity: Option<String>,
}

/// Full wire bundle from the solver, casing-tolerant like the rest of the
/// ingestion layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPayload {
    #[serde(default, rename = "grid", alias = "Grid", alias = "maze", alias = "Maze")]
    pub grid: Option<GridGeometry>,
    #[serde(default, rename = "algorithm", alias = "Algorithm")]
    pub algorithm: Option<AlgorithmInfo>,
    #[serde(flatten)]
    pub run: RunPayload,
}

/// One normalized replay session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub geometry: GridGeometry,
    pub steps: Vec<StepRecord>,
    pub final_path: Vec<Point>,
    pub algorithm: Option<AlgorithmInfo>,
}

impl Session {
    /// Normalize a parsed payload into a session. The grid is the only part
    /// that must be present; a payload without one is unusable.
    pub fn from_payload(payload: SessionPayload) -> Result<Self> {
        let geometry = payload.grid.ok_or(ViewerError::MissingGeometry)?;
        let run = normalize(&payload.run);
        let session = Self {
            id: Uuid::new_v4(),
            geometry,
            steps: run.steps,
            final_path: run.final_path,
            algorithm: payload.algorithm,
        };
        info!(
            "session {}: {} steps, path length {}, grid {}x{}",
            session.id,
            session.steps.len(),
            session.final_path.len(),
            session.geometry.cols,
            session.geometry.rows,
        );
        Ok(session)
    }

    /// Parse and normalize a session from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let payload: SessionPayload = serde_json::from_str(text)?;
        Self::from_payload(payload)
    }

    pub fn metrics_at(&self, index: usize) -> MetricsReport {
        let algorithm = self.algorithm.as_ref();
        MetricsReport::at(
            index.min(self.steps.len()),
            self.final_path.len(),
            self.geometry.cell_count(),
            algorithm.and_then(|a| a.name.as_deref()),
            algorithm.and_then(|a| a.time_complexity.as_deref()),
            algorithm.and_then(|a| a.space_complexity.as_deref()),
        )
    }
}

/// Owns the currently displayed session, its playback controller, and its
/// drawing surface. The controller is the sole writer of the playback index;
/// the viewer only wires snapshots of it into the pure pipeline.
pub struct ReplayViewer<S: DrawingSurface> {
    session: Option<Session>,
    controller: PlaybackController,
    renderer: MazeRenderer,
    surface: Option<S>,
}

impl<S: DrawingSurface> ReplayViewer<S> {
    pub fn new(theme: Theme) -> Self {
        Self {
            session: None,
            controller: PlaybackController::new(0),
            renderer: MazeRenderer::new(theme),
            surface: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn index(&self) -> usize {
        self.controller.index()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.controller.phase()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn progress(&self) -> f64 {
        self.controller.progress()
    }

    /// Install a new session and its surface, replacing the previous ones
    /// wholesale. The old playback loop is cancelled before any state is
    /// touched, so it can never observe the new session.
    pub fn load_session(&mut self, session: Session, surface: S, sched: &mut dyn FrameScheduler) {
        self.controller.cancel_pending(sched);
        if let Some(mut old) = self.surface.take() {
            old.dispose();
        }
        info!("installing session {}", session.id);
        self.controller = PlaybackController::new(session.steps.len());
        self.surface = Some(surface);
        self.session = Some(session);
    }

    /// Reconstruct the snapshot at the current index and draw it.
    pub fn render_current(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match &self.session {
            Some(session) => {
                let states =
                    reconstruct(&session.steps, &session.final_path, self.controller.index());
                self.renderer.render(surface, Some(&session.geometry), &states);
            }
            None => self.renderer.render(surface, None, &CellStateMap::new()),
        }
    }

    pub fn metrics(&self) -> Option<MetricsReport> {
        self.session
            .as_ref()
            .map(|session| session.metrics_at(self.controller.index()))
    }

    pub fn play(&mut self, sched: &mut dyn FrameScheduler) {
        self.controller.play(sched);
    }

    pub fn pause(&mut self, sched: &mut dyn FrameScheduler) {
        self.controller.pause(sched);
    }

    pub fn step_forward(&mut self) -> bool {
        self.controller.step_forward()
    }

    pub fn step_backward(&mut self) -> bool {
        self.controller.step_backward()
    }

    pub fn seek(&mut self, index: usize) -> bool {
        self.controller.seek(index)
    }

    pub fn reset(&mut self, sched: &mut dyn FrameScheduler) {
        self.controller.reset(sched);
    }

    pub fn set_speed(&mut self, speed: std::time::Duration) {
        self.controller.set_speed(speed);
    }

    pub fn on_frame(&mut self, handle: FrameHandle, sched: &mut dyn FrameScheduler) -> FrameOutcome {
        self.controller.on_frame(handle, sched)
    }

    /// Tear the viewer down: cancel the loop, dispose the surface, drop the
    /// session. Safe to call repeatedly.
    pub fn dispose(&mut self, sched: &mut dyn FrameScheduler) {
        self.controller.cancel_pending(sched);
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
        }
        self.session = None;
        self.controller = PlaybackController::new(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ManualScheduler;
    use crate::surface::RasterSurface;
    use std::time::Duration;

    const SESSION_JSON: &str = r#"{
        "grid": {
            "rows": 2,
            "cols": 2,
            "cells": [
                { "x": 0, "y": 0, "walls": { "top": true, "left": true } },
                { "x": 1, "y": 0, "walls": { "top": true, "right": true } },
                { "x": 0, "y": 1, "walls": { "bottom": true, "left": true } },
                { "x": 1, "y": 1, "walls": { "bottom": true, "right": true } }
            ],
            "start": { "x": 0, "y": 0 },
            "end": { "x": 1, "y": 1 }
        },
        "algorithm": { "name": "bfs" },
        "steps": [
            { "step": 0, "point": { "x": 0, "y": 0 } },
            { "step": 1, "point": { "x": 1, "y": 0 } },
            { "step": 2, "point": { "x": 1, "y": 1 } }
        ],
        "finalPath": [
            { "x": 0, "y": 0 },
            { "x": 1, "y": 0 },
            { "x": 1, "y": 1 }
        ]
    }"#;

    fn viewer_with_session() -> (ReplayViewer<RasterSurface>, ManualScheduler) {
        let mut sched = ManualScheduler::new();
        let mut viewer = ReplayViewer::new(Theme::default());
        let session = Session::from_json(SESSION_JSON).unwrap();
        let surface = RasterSurface::new(64, 64, 1.0, Theme::default().background);
        viewer.load_session(session, surface, &mut sched);
        (viewer, sched)
    }

    #[test]
    fn payload_without_geometry_is_rejected() {
        let err = Session::from_json(r#"{ "steps": [] }"#).unwrap_err();
        assert!(matches!(err, ViewerError::MissingGeometry));
    }

    #[test]
    fn upper_camel_payload_parses_identically() {
        let session = Session::from_json(
            r#"{
                "Grid": {
                    "Rows": 1, "Cols": 2,
                    "Cells": [{ "X": 0, "Y": 0, "Walls": {} }, { "X": 1, "Y": 0, "Walls": {} }],
                    "Start": { "X": 0, "Y": 0 },
                    "End": { "X": 1, "Y": 0 }
                },
                "Steps": [{ "Step": 0, "Point": { "X": 0, "Y": 0 } }],
                "FinalPath": []
            }"#,
        )
        .unwrap();
        assert_eq!(session.geometry.cols, 2);
        assert_eq!(session.steps.len(), 1);
        assert_eq!(session.steps[0].point, Point::new(0, 0));
    }

    #[test]
    fn completed_render_paints_the_solution() {
        let (mut viewer, _sched) = viewer_with_session();
        assert!(viewer.seek(3));
        viewer.render_current();

        // Cell (1,0) is on the path and is neither start nor end; its centre
        // pixel carries the opaque path colour. Grid is 2x2 over 64px.
        let surface = viewer.surface().unwrap();
        let expected = Theme::default().path.to_rgba8();
        assert_eq!(surface.pixel(48, 16).unwrap(), expected);
    }

    #[test]
    fn mid_run_render_shows_no_path_yet() {
        let (mut viewer, _sched) = viewer_with_session();
        assert!(viewer.seek(2));
        viewer.render_current();

        let surface = viewer.surface().unwrap();
        let path = Theme::default().path.to_rgba8();
        assert_ne!(surface.pixel(48, 16).unwrap(), path);
    }

    #[test]
    fn metrics_follow_the_playback_index() {
        let (mut viewer, _sched) = viewer_with_session();
        viewer.step_forward();
        viewer.step_forward();

        let report = viewer.metrics().unwrap();
        assert_eq!(report.algorithm, "bfs");
        assert_eq!(report.steps_explored, 2);
        assert_eq!(report.path_length, 3);
        assert_eq!(report.coverage_pct, 50.0);
        assert_eq!(report.efficiency, 1.5);
    }

    #[test]
    fn replacing_a_session_cancels_the_running_loop() {
        let (mut viewer, mut sched) = viewer_with_session();
        viewer.play(&mut sched);
        assert!(viewer.is_playing());
        assert_eq!(sched.pending_count(), 1);

        let replacement = Session::from_json(SESSION_JSON).unwrap();
        let surface = RasterSurface::new(64, 64, 1.0, Theme::default().background);
        viewer.load_session(replacement, surface, &mut sched);

        // The stale frame was cancelled before the swap: nothing fires, the
        // fresh controller starts idle at zero.
        sched.advance(Duration::from_secs(5));
        assert!(sched.take_fired().is_empty());
        assert_eq!(viewer.index(), 0);
        assert_eq!(viewer.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn autoplay_drives_through_to_completion() {
        let (mut viewer, mut sched) = viewer_with_session();
        viewer.set_speed(Duration::from_millis(10));
        viewer.play(&mut sched);

        for _ in 0..16 {
            sched.advance(Duration::from_millis(10));
            for handle in sched.take_fired() {
                viewer.on_frame(handle, &mut sched);
            }
        }

        assert_eq!(viewer.phase(), PlaybackPhase::Completed);
        assert_eq!(viewer.index(), 3);
        assert_eq!(viewer.progress(), 1.0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let (mut viewer, mut sched) = viewer_with_session();
        viewer.play(&mut sched);
        viewer.dispose(&mut sched);
        viewer.dispose(&mut sched);

        assert!(viewer.session().is_none());
        assert!(viewer.surface().is_none());
        assert!(sched.take_fired().is_empty());
        // Rendering with nothing loaded is a silent no-op.
        viewer.render_current();
    }
}
