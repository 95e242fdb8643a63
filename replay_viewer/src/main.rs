// main.rs - Headless replay viewer CLI
// Loads a solver session, replays it, and exports PNG snapshots: a single
// index on demand, the final solved state by default, or one frame per step
// of a timed playback.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use maze_replay_viewer::{
    Colour, FrameOutcome, RasterSurface, ReplayViewer, Session, Theme, WallClockScheduler,
};

// Bundled fallback session, crate-absolute to avoid cwd surprises.
const DEMO_SESSION: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/demo_session.json"
));

/// Per-step delay bounds of the playback speed control.
const MIN_SPEED_MS: u64 = 10;
const MAX_SPEED_MS: u64 = 500;

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to session JSON; omit to replay the built-in demo session
    #[arg(short, long)]
    session: Option<PathBuf>,

    /// Output PNG path; with --play, a directory receiving one PNG per step
    #[arg(short, long, default_value = "replay.png")]
    output: PathBuf,

    /// Surface width in CSS pixels
    #[arg(short = 'W', long, default_value = "1024")]
    width: u32,

    /// Surface height in CSS pixels
    #[arg(short = 'H', long, default_value = "768")]
    height: u32,

    /// Device pixel ratio of the backing surface
    #[arg(long, default_value = "1.0")]
    dpr: f32,

    /// Render a single snapshot at this playback index
    #[arg(long)]
    at: Option<usize>,

    /// Run a timed playback instead of a single snapshot
    #[arg(long)]
    play: bool,

    /// Per-step delay in milliseconds (clamped to 10..=500)
    #[arg(long, default_value = "120")]
    speed: u64,

    /// Frame rate of the playback loop
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Background colour as #rrggbb or #rrggbbaa
    #[arg(long)]
    background: Option<String>,

    /// Print the metrics report for the rendered index
    #[arg(long)]
    metrics: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = match &args.session {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?,
        None => {
            info!("no session file given, replaying the built-in demo");
            DEMO_SESSION.to_string()
        }
    };
    let session = Session::from_json(&text).context("failed to ingest session payload")?;
    let total = session.steps.len();

    let mut theme = Theme::default();
    if let Some(literal) = &args.background {
        theme.background = Colour::from_hex(literal)?;
    }

    let mut sched = WallClockScheduler::new(args.fps);
    let mut viewer = ReplayViewer::new(theme);
    let surface = RasterSurface::new(args.width, args.height, args.dpr, theme.background);
    viewer.load_session(session, surface, &mut sched);

    if args.play {
        play_through(&mut viewer, &mut sched, &args).await?;
    } else {
        let index = args.at.unwrap_or(total);
        viewer.seek(index);
        viewer.render_current();
        export_snapshot(&viewer, &args.output)?;
        info!("wrote snapshot at index {} to {}", viewer.index(), args.output.display());
    }

    if args.metrics {
        let report = viewer.metrics().context("no session loaded")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    viewer.dispose(&mut sched);
    Ok(())
}

/// Timed playback: one exported frame per accepted step, plus the initial
/// and final states.
async fn play_through(
    viewer: &mut ReplayViewer<RasterSurface>,
    sched: &mut WallClockScheduler,
    args: &Args,
) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create frame directory {}", args.output.display()))?;
    viewer.set_speed(Duration::from_millis(args.speed.clamp(MIN_SPEED_MS, MAX_SPEED_MS)));

    viewer.render_current();
    export_frame(viewer, &args.output, 0)?;

    viewer.play(sched);
    while let Some(handle) = sched.next_frame().await {
        match viewer.on_frame(handle, sched) {
            FrameOutcome::Advanced(index) => {
                viewer.render_current();
                export_frame(viewer, &args.output, index)?;
            }
            FrameOutcome::Finished => {
                viewer.render_current();
                export_frame(viewer, &args.output, viewer.index())?;
            }
            FrameOutcome::Waiting => {}
        }
    }

    info!(
        "playback finished after {} steps, frames in {}",
        viewer.index(),
        args.output.display()
    );
    Ok(())
}

fn export_frame(viewer: &ReplayViewer<RasterSurface>, dir: &Path, index: usize) -> Result<()> {
    export_snapshot(viewer, &dir.join(format!("frame_{index:04}.png")))
}

fn export_snapshot(viewer: &ReplayViewer<RasterSurface>, path: &Path) -> Result<()> {
    let surface = viewer.surface().context("no active drawing surface")?;
    let png = surface.to_png()?;
    fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
