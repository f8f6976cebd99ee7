//! Session tunables for gesture classification, cursor mapping and clicking.
//!
//! A `Config` is a plain `Copy` value.  The controller takes a snapshot at
//! the start of every frame and every dwell tick, so a reconfiguration that
//! lands mid-session is only observed from the next activation onwards.

use std::time::Duration;

// ── Defaults ───────────────────────────────────────────────

/// Screen pixels moved per camera-space meter, as a fraction of screen size.
pub const MOUSE_SENSITIVITY: f32 = 3.5;
/// Seconds the cursor must stay still before a dwell click fires.
pub const TIME_REQUIRED: f32 = 2.0;
/// Radius in pixels the cursor may wander while dwelling.
pub const PAUSE_THRESHOLD: f32 = 60.0;
pub const DO_CLICK: bool = true;
pub const USE_GRIP_GESTURE: bool = true;
/// Exponential smoothing weight, 0 = raw movement.
pub const CURSOR_SMOOTHING: f32 = 0.2;
/// Upper bound accepted for `cursor_smoothing`.
pub const MAX_CURSOR_SMOOTHING: f32 = 0.95;

// ── Click mode ─────────────────────────────────────────────

/// How clicks are produced, derived from `do_click` and `use_grip_gesture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    /// Closing the hand presses the button, opening it releases.
    Grip,
    /// Holding the cursor still fires a synthetic click.
    Dwell,
    /// Cursor only; no button events are produced.
    Disabled,
}

impl ClickMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grip => "grip",
            Self::Dwell => "dwell",
            Self::Disabled => "disabled",
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Cursor gain applied to camera-space hand displacement.
    pub mouse_sensitivity: f32,
    /// Dwell hold time in seconds.
    pub time_required: f32,
    /// Dwell radius in screen pixels.
    pub pause_threshold: f32,
    /// Produce button events at all.
    pub do_click: bool,
    /// Click by gripping instead of dwelling.
    pub use_grip_gesture: bool,
    /// Cursor smoothing in `[0, 0.95]`.
    pub cursor_smoothing: f32,
    /// Screen size override; when `None` the pointer sink is asked.
    pub screen: Option<(i32, i32)>,
    /// Dwell timer period.
    pub tick_interval: Duration,
    /// Interval between periodic status log lines.
    pub status_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mouse_sensitivity: MOUSE_SENSITIVITY,
            time_required: TIME_REQUIRED,
            pause_threshold: PAUSE_THRESHOLD,
            do_click: DO_CLICK,
            use_grip_gesture: USE_GRIP_GESTURE,
            cursor_smoothing: CURSOR_SMOOTHING,
            screen: None,
            tick_interval: Duration::from_millis(100),
            status_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Return a copy with every numeric option forced into its valid range.
    ///
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(mut self) -> Self {
        self.mouse_sensitivity = non_negative_or(self.mouse_sensitivity, MOUSE_SENSITIVITY);
        self.time_required = non_negative_or(self.time_required, TIME_REQUIRED);
        self.pause_threshold = non_negative_or(self.pause_threshold, PAUSE_THRESHOLD);
        self.cursor_smoothing = if self.cursor_smoothing.is_finite() {
            self.cursor_smoothing.clamp(0.0, MAX_CURSOR_SMOOTHING)
        } else {
            CURSOR_SMOOTHING
        };
        if self.tick_interval.is_zero() {
            self.tick_interval = Duration::from_millis(100);
        }
        self.screen = self.screen.filter(|&(w, h)| w > 0 && h > 0);
        self
    }

    pub fn click_mode(&self) -> ClickMode {
        match (self.do_click, self.use_grip_gesture) {
            (true, true) => ClickMode::Grip,
            (true, false) => ClickMode::Dwell,
            (false, _) => ClickMode::Disabled,
        }
    }

    /// Dwell hold time as a `Duration`.
    pub fn dwell_duration(&self) -> Duration {
        if !(self.time_required > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f32(self.time_required).unwrap_or(Duration::MAX)
    }

    /// Parse a "WxH" resolution string. Returns (width, height) or None.
    pub fn parse_screen(s: &str) -> Option<(i32, i32)> {
        let (w, h) = s.split_once('x')?;
        let w = w.trim().parse::<i32>().ok()?;
        let h = h.trim().parse::<i32>().ok()?;
        if w > 0 && h > 0 {
            Some((w, h))
        } else {
            None
        }
    }

    /// Generate s-expression for status logging.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:mouse-sensitivity {:.2} :time-required {:.2} :pause-threshold {:.1} :click-mode :{} :cursor-smoothing {:.2} :tick-ms {})",
            self.mouse_sensitivity,
            self.time_required,
            self.pause_threshold,
            self.click_mode().as_str(),
            self.cursor_smoothing,
            self.tick_interval.as_millis(),
        )
    }
}

fn non_negative_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}
