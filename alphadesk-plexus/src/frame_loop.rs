//! Background task driving a [`PlexusView`] at a fixed frame rate.

use crate::render::{PlexusView, Surface};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default frame rate.
pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone, Copy)]
enum Command {
    Resize(f32, f32),
    Ripple(u64),
}

/// Handle for a running frame loop.
///
/// The view is owned by the background task. Cancelling the token, calling
/// [`shutdown`](Self::shutdown) or dropping the handle stops the loop and
/// drops the view together with its surface.
#[derive(Debug)]
pub struct FrameLoop {
    handle: Option<JoinHandle<u64>>,
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
}

impl FrameLoop {
    /// Start drawing `view` at `fps` frames per second until `cancel` fires.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<S>(view: PlexusView<S>, fps: u32, cancel: CancellationToken) -> Self
    where
        S: Surface + Send + 'static,
    {
        let period = frame_period(fps);
        let (commands, mut command_rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));

        let token = cancel.clone();
        let running_flag = Arc::clone(&running);
        let handle = tokio::spawn(async move {
            let mut view = view;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = Instant::now();
            let mut frames = 0u64;

            debug!(fps, "Frame loop started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    Some(command) = command_rx.recv() => match command {
                        Command::Resize(width, height) => {
                            view.scene_mut().resize(width, height);
                        }
                        Command::Ripple(counter) => {
                            view.scene_mut().trigger_ripple(counter);
                        }
                    },
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        if view.frame(now - last) {
                            frames += 1;
                        }
                        last = now;
                    }
                }
            }

            drop(view);
            running_flag.store(false, Ordering::Release);
            debug!(frames, "Frame loop stopped");
            frames
        });

        Self {
            handle: Some(handle),
            commands,
            cancel,
            running,
        }
    }

    /// Whether the loop is still scheduling frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Token that stops the loop.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Forward new surface dimensions to the scene.
    pub fn resize(&self, width: f32, height: f32) {
        let _ = self.commands.send(Command::Resize(width, height));
    }

    /// Forward a ripple trigger value to the scene.
    pub fn trigger_ripple(&self, counter: u64) {
        let _ = self.commands.send(Command::Ripple(counter));
    }

    /// Stop the loop and wait for it. Returns the number of frames drawn.
    pub async fn shutdown(mut self) -> u64 {
        self.cancel.cancel();
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.await {
            Ok(frames) => frames,
            Err(e) => {
                warn!(error = %e, "Frame loop task failed");
                0
            }
        }
    }
}

/// Interval between frames at `fps`. Zero fps is treated as one; the period
/// never drops below one nanosecond, which `tokio::time::interval` requires.
fn frame_period(fps: u32) -> Duration {
    (Duration::from_secs(1) / fps.max(1)).max(Duration::from_nanos(1))
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
