//! Event loop backend.
//!
//! Frames and the dwell timer are both calloop sources on one loop, so the
//! controller state is only ever touched from this thread.  The loop also
//! watches process signals, an optional exit timer and a control channel
//! for runtime reconfiguration, and logs a status line periodically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use calloop::channel::{self, Channel, Event};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, RegistrationToken};
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::pointer::PointerSink;
use crate::source::{FrameSender, FrameSource};
use crate::state::{ControllerState, SessionStats};
use crate::tracking::FrameEvent;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
/// Global flag set by the SIGUSR1 handler.
static RESET_REQUESTED: AtomicBool = AtomicBool::new(false);

// ── Control ────────────────────────────────────────────────

/// Requests accepted by a running backend.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    /// Replace the controller configuration.
    Reconfigure(Config),
    /// Forget grip origins and tracking validity.
    ResetOrigin,
    /// Stop the loop and tear down.
    Shutdown,
}

/// Sending half of the control channel.
pub type ControlSender = channel::Sender<ControlEvent>;

/// Loop-level settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Stop after this long (for demos and CI).
    pub exit_after: Option<Duration>,
    /// Longest time a single dispatch may block.
    pub poll_interval: Duration,
    /// Install SIGTERM/SIGINT/SIGUSR1 handlers.
    pub install_signals: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            exit_after: None,
            poll_interval: Duration::from_millis(100),
            install_signals: true,
        }
    }
}

// ── Signals ────────────────────────────────────────────────

/// Install signal handlers for shutdown (SIGTERM, SIGINT) and origin reset
/// (SIGUSR1).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, shutdown_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, shutdown_handler as libc::sighandler_t);
        libc::signal(libc::SIGUSR1, reset_handler as libc::sighandler_t);
    }
}

extern "C" fn shutdown_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

extern "C" fn reset_handler(_sig: libc::c_int) {
    RESET_REQUESTED.store(true, Ordering::SeqCst);
}

// ── Backend ────────────────────────────────────────────────

/// Event loop with the controller state as its shared data.
pub struct Backend<P: PointerSink + 'static> {
    event_loop: EventLoop<'static, ControllerState<P>>,
    state: ControllerState<P>,
    frame_tx: Option<FrameSender>,
    control_tx: ControlSender,
    timer: Option<RegistrationToken>,
    config: BackendConfig,
}

impl<P: PointerSink + 'static> Backend<P> {
    /// Create the loop and register the frame channel, control channel and
    /// dwell timer.
    pub fn new(state: ControllerState<P>, config: BackendConfig) -> Result<Self, Error> {
        let event_loop = EventLoop::<ControllerState<P>>::try_new()
            .map_err(|e| Error::EventLoop(format!("failed to create event loop: {}", e)))?;
        let handle = event_loop.handle();

        let (frame_tx, frame_rx): (FrameSender, Channel<FrameEvent>) = channel::channel();
        handle
            .insert_source(frame_rx, |event, _, state| match event {
                Event::Msg(frame) => state.on_frame(&frame),
                Event::Closed => {
                    info!("frame source finished");
                    state.running = false;
                }
            })
            .map_err(|e| Error::EventLoop(format!("failed to register frame channel: {}", e.error)))?;

        let (control_tx, control_rx) = channel::channel::<ControlEvent>();
        handle
            .insert_source(control_rx, |event, _, state| {
                if let Event::Msg(control) = event {
                    match control {
                        ControlEvent::Reconfigure(config) => state.reconfigure(config),
                        ControlEvent::ResetOrigin => state.reset_origin(),
                        ControlEvent::Shutdown => {
                            info!("shutdown requested");
                            state.running = false;
                        }
                    }
                }
            })
            .map_err(|e| Error::EventLoop(format!("failed to register control channel: {}", e.error)))?;

        // The period is re-read on every fire so reconfiguration applies
        // from the next tick.
        let timer = handle
            .insert_source(
                Timer::from_duration(state.config().tick_interval),
                |_deadline, _, state| {
                    state.on_tick();
                    TimeoutAction::ToDuration(state.config().tick_interval)
                },
            )
            .map_err(|e| Error::EventLoop(format!("failed to register dwell timer: {}", e.error)))?;

        Ok(Self {
            event_loop,
            state,
            frame_tx: Some(frame_tx),
            control_tx,
            timer: Some(timer),
            config,
        })
    }

    /// A handle for sending control requests to this backend.
    pub fn control(&self) -> ControlSender {
        self.control_tx.clone()
    }

    pub fn state(&self) -> &ControllerState<P> {
        &self.state
    }

    /// Open `source`, run until shutdown, then tear down.
    ///
    /// Fails without entering the loop when the source cannot be opened.
    /// Teardown clears `running` first, then removes the timer, closes the
    /// source and finally releases any held button.
    pub fn run<S>(&mut self, source: &mut S) -> anyhow::Result<SessionStats>
    where
        S: FrameSource + ?Sized,
    {
        let frame_tx = self
            .frame_tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("backend already ran"))?;
        source.open(frame_tx)?;
        info!("Frame source opened: {}", source.name());

        if self.config.install_signals {
            install_signal_handlers();
        }

        let result = self.drive();

        self.state.running = false;
        if let Some(token) = self.timer.take() {
            self.event_loop.handle().remove(token);
        }
        source.close();
        let stats = self.state.shutdown();
        info!("Backend shut down (source: {})", source.name());

        result.map(|()| stats)
    }

    fn drive(&mut self) -> anyhow::Result<()> {
        let start_time = Instant::now();
        let mut last_status_log = Instant::now();
        info!(
            "Entering event loop (poll {}ms, dwell tick {}ms)",
            self.config.poll_interval.as_millis(),
            self.state.config().tick_interval.as_millis()
        );

        while self.state.running {
            if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
                info!("Shutdown signal received, exiting");
                break;
            }

            if RESET_REQUESTED.swap(false, Ordering::SeqCst) {
                self.state.reset_origin();
            }

            if let Some(limit) = self.config.exit_after {
                if start_time.elapsed() >= limit {
                    info!("Exit timer fired after {:.1}s", limit.as_secs_f32());
                    break;
                }
            }

            if last_status_log.elapsed() >= self.state.config().status_interval {
                info!("Controller status: {}", self.state.status_sexp());
                last_status_log = Instant::now();
            }

            self.event_loop
                .dispatch(Some(self.config.poll_interval), &mut self.state)
                .map_err(|e| anyhow::anyhow!("event loop dispatch failed: {}", e))?;
        }

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClickMode;
    use crate::cursor::CursorSample;
    use crate::error::Result;
    use crate::pointer::{PointerAction, RecordingPointer};
    use crate::tracking::{Body, CameraPoint, Frame, HandState, JointType};

    /// Sends a fixed list of events on open.  Keeps the sender alive unless
    /// `finish` is set.
    struct ListSource {
        events: Vec<FrameEvent>,
        finish: bool,
        held: Option<FrameSender>,
        closed: bool,
    }

    impl ListSource {
        fn new(events: Vec<FrameEvent>, finish: bool) -> Self {
            Self {
                events,
                finish,
                held: None,
                closed: false,
            }
        }
    }

    impl FrameSource for ListSource {
        fn name(&self) -> &'static str {
            "list"
        }

        fn open(&mut self, tx: FrameSender) -> Result<()> {
            for event in self.events.drain(..) {
                tx.send(event)
                    .map_err(|e| Error::SensorUnavailable(e.to_string()))?;
            }
            if !self.finish {
                self.held = Some(tx);
            }
            Ok(())
        }

        fn close(&mut self) {
            self.held = None;
            self.closed = true;
        }
    }

    struct MissingSensor;

    impl FrameSource for MissingSensor {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn open(&mut self, _tx: FrameSender) -> Result<()> {
            Err(Error::SensorUnavailable("no device".into()))
        }

        fn close(&mut self) {}
    }

    fn grip(state: HandState) -> FrameEvent {
        let mut body = Body::tracked();
        body.set_joint(JointType::SpineBase, CameraPoint::new(0.0, 0.0, 2.0));
        body.set_joint(JointType::HandLeft, CameraPoint::new(-0.2, 0.0, 2.0));
        body.set_joint(JointType::HandRight, CameraPoint::new(0.5, 0.2, 1.5));
        body.hand_right = state;
        FrameEvent::Frame(Frame::new(vec![body], 0))
    }

    fn backend(config: Config, exit_after: Option<Duration>) -> Backend<RecordingPointer> {
        let state = ControllerState::new(config, RecordingPointer::default()).unwrap();
        Backend::new(
            state,
            BackendConfig {
                exit_after,
                poll_interval: Duration::from_millis(10),
                install_signals: false,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_runs_until_source_finishes() {
        let mut backend = backend(Config::default(), Some(Duration::from_secs(10)));
        let mut source = ListSource::new(
            vec![grip(HandState::Closed), FrameEvent::Dropped, grip(HandState::Closed)],
            true,
        );

        let stats = backend.run(&mut source).unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.grips, 1);
        assert!(source.closed);
    }

    #[test]
    fn test_missing_sensor_is_fatal() {
        let mut backend = backend(Config::default(), None);
        let err = backend.run(&mut MissingSensor).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SensorUnavailable(_))
        ));
        assert_eq!(backend.state().stats().frames, 0);
    }

    #[test]
    fn test_second_run_rejected() {
        let mut backend = backend(Config::default(), Some(Duration::from_millis(20)));
        backend.run(&mut ListSource::new(Vec::new(), true)).unwrap();
        assert!(backend.run(&mut ListSource::new(Vec::new(), true)).is_err());
    }

    #[test]
    fn test_control_shutdown_stops_loop() {
        let mut backend = backend(Config::default(), Some(Duration::from_secs(10)));
        backend.control().send(ControlEvent::Shutdown).unwrap();
        let mut source = ListSource::new(Vec::new(), false);

        let started = Instant::now();
        backend.run(&mut source).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(source.closed);
    }

    #[test]
    fn test_exit_timer_stops_loop() {
        let mut backend = backend(Config::default(), Some(Duration::from_millis(50)));
        let mut source = ListSource::new(Vec::new(), false);
        let stats = backend.run(&mut source).unwrap();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn test_held_button_released_on_teardown() {
        let mut backend = backend(Config::default(), Some(Duration::from_millis(50)));
        let mut source = ListSource::new(vec![grip(HandState::Closed)], false);
        let stats = backend.run(&mut source).unwrap();

        assert_eq!(stats.grips, 1);
        assert!(!backend.state().running);
        assert!(!backend.state().is_button_held());
        assert_eq!(
            backend.state().pointer().actions().last(),
            Some(&PointerAction::ButtonUp)
        );
    }

    #[test]
    fn test_control_reconfigure_reaches_timer() {
        let mut backend = backend(Config::default(), Some(Duration::from_millis(300)));
        backend.state.on_frame(&grip(HandState::Closed));
        let mut source = ListSource::new(Vec::new(), false);
        let dwell = Config {
            use_grip_gesture: false,
            tick_interval: Duration::from_millis(10),
            ..Config::default()
        };
        backend.control().send(ControlEvent::Reconfigure(dwell)).unwrap();

        backend.run(&mut source).unwrap();

        let state = backend.state();
        assert_eq!(state.config().click_mode(), ClickMode::Dwell);
        // At least one dwell tick sampled the cursor.
        assert_eq!(state.dwell().last_cursor(), CursorSample::new(960, 540));
    }
}
