// replay/scheduler.rs - Frame scheduling port for the playback loop
//
// The controller never talks to a concrete timer API. It asks a scheduler
// for "one callback before the next repaint" and measures elapsed time on
// the scheduler's clock, so tests drive playback deterministically and the
// CLI paces it against the wall clock.

use std::time::{Duration, Instant};

/// Cancellable handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Host-provided scheduling primitive.
///
/// A scheduled callback fires at most once; a cancelled handle never fires.
/// `now` must be monotonic for the lifetime of the scheduler.
pub trait FrameScheduler {
    /// Queue one callback before the next repaint.
    fn schedule(&mut self) -> FrameHandle;

    /// Cancel a pending callback. Cancelling an already-fired or unknown
    /// handle is a no-op.
    fn cancel(&mut self, handle: FrameHandle);

    /// Monotonic clock used for step pacing.
    fn now(&self) -> Duration;
}

/// Deterministic scheduler with a virtual clock.
///
/// Fired handles are handed back through [`ManualScheduler::take_fired`];
/// the embedder decides when a "repaint" happens by draining that queue.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    clock: Duration,
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, dt: Duration) {
        self.clock += dt;
    }

    /// Drain every pending handle, simulating one repaint boundary.
    pub fn take_fired(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }

    fn now(&self) -> Duration {
        self.clock
    }
}

/// Wall-clock scheduler for headless playback.
///
/// One pending slot: the playback loop never queues more than one frame at a
/// time, and scheduling a new frame supersedes an unfired one. `next_frame`
/// awaits the repaint interval on the current-thread runtime and hands the
/// pending handle back to the driver.
#[derive(Debug)]
pub struct WallClockScheduler {
    origin: Instant,
    frame_interval: Duration,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl WallClockScheduler {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            origin: Instant::now(),
            frame_interval: Duration::from_secs(1) / fps,
            next_id: 0,
            pending: None,
        }
    }

    /// Wait for the next repaint boundary. Returns `None` when nothing is
    /// scheduled, which is how the drive loop observes auto-pause.
    pub async fn next_frame(&mut self) -> Option<FrameHandle> {
        self.pending?;
        tokio::time::sleep(self.frame_interval).await;
        self.pending.take()
    }
}

impl FrameScheduler for WallClockScheduler {
    fn schedule(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
