//! Controller state: the single struct owning everything the frame and
//! tick handlers touch.
//!
//! Both handlers run on the event loop thread and take `&mut self`, so
//! grip state, tracking validity and the dwell sample are never shared
//! across threads.  Each frame publishes a fresh `TrackingSnapshot` that
//! the next dwell tick reads whole.

use tracing::{debug, info, trace, warn};

use crate::config::{ClickMode, Config};
use crate::cursor::{self, ScreenSize};
use crate::dwell::{DwellOutcome, DwellTimer};
use crate::error::{Error, Result};
use crate::pointer::PointerSink;
use crate::tracking::{zoom, FrameEvent, GestureClassifier, PointerCommand, Zone, ZoomGesture};

// ── Snapshot & counters ────────────────────────────────────

/// What the most recent frame concluded, as read by the dwell timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackingSnapshot {
    /// A hand is driving the cursor.
    pub tracking_valid: bool,
    /// Sequence number of the frame that produced this snapshot.
    pub frame_seq: u64,
    /// `None` when no body was tracked.
    pub zone: Option<Zone>,
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub frames: u64,
    pub dropped: u64,
    /// Frames in which a tracked body was selected.
    pub tracked: u64,
    pub grips: u64,
    pub clicks: u64,
    pub zoom_in: u64,
    pub zoom_out: u64,
    pub sink_failures: u64,
}

impl SessionStats {
    /// Generate s-expression for status logging.
    pub fn stats_sexp(&self) -> String {
        format!(
            "(:frames {} :dropped {} :tracked {} :grips {} :clicks {} :zoom-in {} :zoom-out {} :sink-failures {})",
            self.frames,
            self.dropped,
            self.tracked,
            self.grips,
            self.clicks,
            self.zoom_in,
            self.zoom_out,
            self.sink_failures,
        )
    }
}

// ── Controller ─────────────────────────────────────────────

/// Central controller state.
pub struct ControllerState<P: PointerSink = Box<dyn PointerSink>> {
    config: Config,
    screen: ScreenSize,
    classifier: GestureClassifier,
    dwell: DwellTimer,
    pointer: P,
    snapshot: TrackingSnapshot,
    stats: SessionStats,
    /// Whether we pressed the button and have not released it yet.
    button_held: bool,
    /// Cleared once teardown starts; handlers do nothing afterwards.
    pub running: bool,
}

impl<P: PointerSink> ControllerState<P> {
    /// Build the controller around a pointer sink.
    ///
    /// The screen size comes from `config.screen` when set, otherwise from
    /// the sink.
    pub fn new(config: Config, pointer: P) -> Result<Self> {
        let config = config.sanitized();
        let screen = resolve_screen(&config, &pointer)?;

        info!(
            pointer = pointer.name(),
            width = screen.width,
            height = screen.height,
            click_mode = config.click_mode().as_str(),
            "controller ready"
        );

        Ok(Self {
            config,
            screen,
            classifier: GestureClassifier::new(),
            dwell: DwellTimer::new(),
            pointer,
            snapshot: TrackingSnapshot::default(),
            stats: SessionStats::default(),
            button_held: false,
            running: true,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        self.snapshot
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn dwell(&self) -> &DwellTimer {
        &self.dwell
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut P {
        &mut self.pointer
    }

    pub fn is_button_held(&self) -> bool {
        self.button_held
    }

    // ── Frame handling ─────────────────────────────────────

    /// Process one frame notification to completion.
    pub fn on_frame(&mut self, event: &FrameEvent) {
        if !self.running {
            return;
        }
        let config = self.config;

        self.stats.frames += 1;
        if matches!(event, FrameEvent::Dropped) {
            self.stats.dropped += 1;
            trace!(seq = self.stats.frames, "frame acquisition failed");
        }

        let body = event.selected_body();
        if body.is_some() {
            self.stats.tracked += 1;
        }

        let classification = self.classifier.classify(body, &config);
        for command in &classification.commands {
            self.apply(*command, &config);
        }

        if let Some(gesture) = body.and_then(zoom::detect) {
            self.apply_zoom(gesture);
        }

        self.snapshot = TrackingSnapshot {
            tracking_valid: classification.tracking_valid,
            frame_seq: self.stats.frames,
            zone: classification.zone,
        };
    }

    fn apply(&mut self, command: PointerCommand, config: &Config) {
        match command {
            PointerCommand::ButtonDown => match self.pointer.button_down() {
                Ok(()) => {
                    self.button_held = true;
                    self.stats.grips += 1;
                    debug!("button down");
                }
                Err(e) => self.sink_failed("button_down", e),
            },
            PointerCommand::ButtonUp => match self.pointer.button_up() {
                Ok(()) => {
                    self.button_held = false;
                    debug!("button up");
                }
                Err(e) => self.sink_failed("button_up", e),
            },
            PointerCommand::Recenter => {
                let center = self.screen.center();
                if let Err(e) = self.pointer.set_position(center) {
                    self.sink_failed("recenter", e);
                }
            }
            PointerCommand::MoveBy { dx, dy } => {
                let current = match self.pointer.position() {
                    Ok(position) => position,
                    Err(e) => return self.sink_failed("position", e),
                };
                let next = cursor::map_displacement(
                    dx,
                    dy,
                    config.mouse_sensitivity,
                    config.cursor_smoothing,
                    self.screen,
                    current,
                );
                trace!(dx, dy, x = next.x, y = next.y, "cursor move");
                if let Err(e) = self.pointer.set_position(next) {
                    self.sink_failed("set_position", e);
                }
            }
        }
    }

    fn apply_zoom(&mut self, gesture: ZoomGesture) {
        let result = match gesture {
            ZoomGesture::Out => self.pointer.wheel_out(),
            ZoomGesture::In => self.pointer.wheel_in(),
        };
        match result {
            Ok(()) => {
                match gesture {
                    ZoomGesture::Out => self.stats.zoom_out += 1,
                    ZoomGesture::In => self.stats.zoom_in += 1,
                }
                debug!(gesture = gesture.as_str(), "zoom");
            }
            Err(e) => self.sink_failed(gesture.as_str(), e),
        }
    }

    // ── Timer handling ─────────────────────────────────────

    /// Run one dwell-timer tick against the latest snapshot.
    ///
    /// Returns `None` when stopped or when the cursor could not be read.
    pub fn on_tick(&mut self) -> Option<DwellOutcome> {
        if !self.running {
            return None;
        }
        let config = self.config;
        let pointer = &mut self.pointer;

        match self
            .dwell
            .tick(&config, self.snapshot.tracking_valid, || pointer.position())
        {
            Ok(DwellOutcome::Click) => {
                match self.pointer.click() {
                    Ok(()) => self.stats.clicks += 1,
                    Err(e) => self.sink_failed("click", e),
                }
                Some(DwellOutcome::Click)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.sink_failed("position", e);
                None
            }
        }
    }

    // ── Session operations ─────────────────────────────────

    /// Swap in a new configuration; observed from the next frame or tick.
    pub fn reconfigure(&mut self, config: Config) {
        let config = config.sanitized();
        let previous = self.config;
        self.config = config;

        if config.screen != previous.screen {
            match resolve_screen(&config, &self.pointer) {
                Ok(screen) => self.screen = screen,
                Err(e) => warn!(error = %e, "keeping previous screen size"),
            }
        }

        if config.click_mode() != previous.click_mode() {
            self.dwell.clear();
            self.classifier.release_all();
            if config.click_mode() != ClickMode::Grip {
                self.release_button();
            }
        }

        info!("Reconfigured: {}", config.config_sexp());
    }

    /// Forget both grip origins, clear validity and the dwell count.
    pub fn reset_origin(&mut self) {
        self.classifier.reset();
        self.dwell.clear();
        self.snapshot.tracking_valid = false;
        self.release_button();
        info!("tracking origin reset");
    }

    /// Stop handling events and release anything still pressed.
    pub fn shutdown(&mut self) -> SessionStats {
        self.running = false;
        self.release_button();
        info!("Controller stopped: {}", self.stats.stats_sexp());
        self.stats
    }

    fn release_button(&mut self) {
        if !self.button_held {
            return;
        }
        match self.pointer.button_up() {
            Ok(()) => {
                self.button_held = false;
                info!("released held button");
            }
            Err(e) => self.sink_failed("button_up", e),
        }
    }

    fn sink_failed(&mut self, op: &str, err: Error) {
        self.stats.sink_failures += 1;
        warn!(op, error = %err, "pointer sink call failed");
    }

    /// Generate s-expression for status logging.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:running {} :zone {} :button-held {} :stats {} :classifier {} :dwell {})",
            if self.running { "t" } else { "nil" },
            self.snapshot.zone.map_or("nil", |z| z.as_str()),
            if self.button_held { "t" } else { "nil" },
            self.stats.stats_sexp(),
            self.classifier.status_sexp(),
            self.dwell.status_sexp(),
        )
    }
}

fn resolve_screen<P: PointerSink>(config: &Config, pointer: &P) -> Result<ScreenSize> {
    match config.screen {
        Some(size) => Ok(ScreenSize::from(size)),
        None => pointer.screen_size(),
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn test_controller(config: Config) -> ControllerState<crate::pointer::RecordingPointer> {
    ControllerState::new(config, crate::pointer::RecordingPointer::default()).unwrap()
}

#[cfg(test)]
fn right_hand(x: f32, y: f32, state: crate::tracking::HandState) -> FrameEvent {
    use crate::tracking::{Body, CameraPoint, Frame, HandState, JointType};

    let mut body = Body::tracked();
    body.set_joint(JointType::SpineBase, CameraPoint::new(0.0, 0.0, 2.0));
    body.set_joint(JointType::ElbowLeft, CameraPoint::new(-0.2, 0.0, 2.0));
    body.set_joint(JointType::ElbowRight, CameraPoint::new(0.2, 0.0, 2.0));
    body.set_joint(JointType::HandLeft, CameraPoint::new(-0.18, 0.0, 1.9));
    body.set_joint(JointType::HandRight, CameraPoint::new(x, y, 1.5));
    body.hand_left = HandState::Open;
    body.hand_right = state;
    FrameEvent::Frame(Frame::new(vec![body], 0))
}

// ── Tests ──────────────────────────────────────────────────
