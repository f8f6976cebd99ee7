//! Frame sources.
//!
//! A source delivers `FrameEvent`s asynchronously from its own thread into
//! a calloop channel.  The event loop owns the receiving end, so frame
//! handling always runs on the loop thread.

pub mod replay;
pub mod scripted;

pub use replay::ReplaySource;
pub use scripted::ScriptedSource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tracking::FrameEvent;

/// Sending half of the frame channel.
pub type FrameSender = calloop::channel::Sender<FrameEvent>;

/// Default pacing between delivered frames (~30 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Longest single sleep, so a stop request is noticed promptly.
const STOP_POLL: Duration = Duration::from_millis(10);

// ── Source trait ───────────────────────────────────────────

/// Producer of skeletal frames.
pub trait FrameSource {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Start delivering frames into `tx`.
    ///
    /// Fails with `Error::SensorUnavailable` (or `Error::Replay` for bad
    /// recordings) when the source cannot start; nothing is delivered then.
    fn open(&mut self, tx: FrameSender) -> Result<()>;

    /// Stop delivery and wait for the producer to finish.  No frame is sent
    /// after this returns.  Safe to call more than once.
    fn close(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&mut self, tx: FrameSender) -> Result<()> {
        (**self).open(tx)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

// ── Delivery thread ────────────────────────────────────────

/// Background thread pushing a frame sequence into the channel at a fixed
/// pace.  Dropping the sender when the sequence ends closes the channel.
#[derive(Debug)]
pub(crate) struct FramePump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FramePump {
    pub(crate) fn spawn<I>(name: &str, interval: Duration, frames: I, tx: FrameSender) -> Result<Self>
    where
        I: Iterator<Item = FrameEvent> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let handle = std::thread::Builder::new()
            .name(format!("frames-{}", name))
            .spawn(move || {
                let mut sent: u64 = 0;
                for event in frames {
                    if thread_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    if tx.send(event).is_err() {
                        debug!("frame receiver dropped");
                        break;
                    }
                    sent += 1;
                    pause(interval, &thread_stop);
                }
                debug!(sent, "frame delivery finished");
            })
            .map_err(|e| Error::SensorUnavailable(format!("failed to start frame thread: {}", e)))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and join it.
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("frame thread panicked");
            }
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep for `interval`, waking early when `stop` is raised.
fn pause(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + interval;
    loop {
        let now = Instant::now();
        if now >= deadline || stop.load(Ordering::Relaxed) {
            return;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL));
    }
}

// ── Tests ──────────────────────────────────────────────────
