// lib.rs - Library exports for maze-replay-viewer
// Replay engine, rendering contract, and session plumbing for external use

pub mod error_handling;
pub mod metrics;
pub mod normalizer;
pub mod renderer;
pub mod replay;
pub mod session;
pub mod surface;
pub mod types;

// Re-export commonly used types
pub use error_handling::{Result, ViewerError};
pub use renderer::{MazeRenderer, Theme};
pub use replay::{
    reconstruct, FrameHandle, FrameOutcome, FrameScheduler, ManualScheduler, PlaybackController,
    PlaybackPhase, WallClockScheduler,
};
pub use session::{ReplayViewer, Session, SessionPayload};
pub use surface::{Colour, DrawingSurface, RasterSurface};
pub use types::{CellState, CellStateMap, GridGeometry, Point, StepKind, StepRecord};
