//! Dwell-click timer.
//!
//! Runs on a fixed period independent of frame delivery.  While a hand is
//! driving the cursor and the cursor stays inside `pause_threshold` pixels
//! of where it was on the previous tick, hold time accumulates; once it
//! exceeds `time_required` a single click fires and the count restarts.

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::{ClickMode, Config};
use crate::cursor::CursorSample;
use crate::error::Result;

// ── Dwell state ────────────────────────────────────────────

/// Phase of the dwell state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DwellPhase {
    #[default]
    Idle,
    /// Cursor has been still for at least one tick.
    Accumulating,
}

impl DwellPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Accumulating => "accumulating",
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellOutcome {
    /// Dwell clicking is not the active click mode.
    Disabled,
    /// No hand is driving the cursor; the count was cleared.
    Invalid,
    /// Cursor held still; more time is needed.
    Holding,
    /// Hold time exceeded; the caller should emit a click.
    Click,
    /// Cursor moved beyond the threshold; the count was cleared.
    Moved,
}

/// Dwell-click timer state.
#[derive(Debug, Clone, Default)]
pub struct DwellTimer {
    phase: DwellPhase,
    elapsed: Duration,
    last_cursor: CursorSample,
}

impl DwellTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DwellPhase {
        self.phase
    }

    /// Accumulated hold time in seconds.
    pub fn time_count(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn last_cursor(&self) -> CursorSample {
        self.last_cursor
    }

    /// Advance one tick of `config.tick_interval`.
    ///
    /// `read_cursor` is only called when the timer is enabled and tracking
    /// is valid.  A failed read leaves the timer untouched.
    pub fn tick<F>(&mut self, config: &Config, tracking_valid: bool, read_cursor: F) -> Result<DwellOutcome>
    where
        F: FnOnce() -> Result<CursorSample>,
    {
        if config.click_mode() != ClickMode::Dwell {
            return Ok(DwellOutcome::Disabled);
        }

        if !tracking_valid {
            self.clear();
            return Ok(DwellOutcome::Invalid);
        }

        let cursor = read_cursor()?;
        let moved = self.last_cursor.distance(&cursor);

        let outcome = if moved < config.pause_threshold {
            self.elapsed += config.tick_interval;
            self.phase = DwellPhase::Accumulating;
            if self.elapsed > config.dwell_duration() {
                debug!(
                    x = cursor.x,
                    y = cursor.y,
                    held_s = self.elapsed.as_secs_f32(),
                    "dwell click"
                );
                self.clear();
                DwellOutcome::Click
            } else {
                trace!(held_s = self.elapsed.as_secs_f32(), "dwell holding");
                DwellOutcome::Holding
            }
        } else {
            trace!(moved_px = moved, "dwell reset, cursor moved");
            self.clear();
            DwellOutcome::Moved
        };

        self.last_cursor = cursor;
        Ok(outcome)
    }

    /// Zero the count and return to idle; the last sample is kept.
    pub fn clear(&mut self) {
        self.elapsed = Duration::ZERO;
        self.phase = DwellPhase::Idle;
    }

    /// Generate s-expression for status logging.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:phase {} :time-count {:.1} :last-cursor ({} {}))",
            self.phase.as_str(),
            self.time_count(),
            self.last_cursor.x,
            self.last_cursor.y,
        )
    }
}

#[cfg(test)]
fn dwell_config() -> Config {
    Config {
        use_grip_gesture: false,
        ..Config::default()
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn at(x: i32, y: i32) -> impl FnOnce() -> Result<CursorSample> {
        move || Ok(CursorSample::new(x, y))
    }

    #[test]
    fn test_twenty_one_still_ticks_click_once() {
        let config = dwell_config();
        let mut timer = DwellTimer::new();

        // First tick moves from (0, 0) to (20, 20): ~28 px, inside 60 px.
        for i in 0..20 {
            let outcome = timer.tick(&config, true, at(20, 20)).unwrap();
            assert_eq!(outcome, DwellOutcome::Holding, "tick {}", i + 1);
        }
        assert!((timer.time_count() - 2.0).abs() < 1e-6);

        let outcome = timer.tick(&config, true, at(20, 20)).unwrap();
        assert_eq!(outcome, DwellOutcome::Click);
        assert_eq!(timer.time_count(), 0.0);
        assert_eq!(timer.phase(), DwellPhase::Idle);

        // Counting restarts; no second click right away.
        let outcome = timer.tick(&config, true, at(20, 20)).unwrap();
        assert_eq!(outcome, DwellOutcome::Holding);
    }

    #[test]
    fn test_invalid_tracking_resets() {
        let config = dwell_config();
        let mut timer = DwellTimer::new();
        for _ in 0..5 {
            timer.tick(&config, true, at(0, 0)).unwrap();
        }
        assert!(timer.time_count() > 0.0);

        let outcome = timer
            .tick(&config, false, || panic!("cursor read while invalid"))
            .unwrap();
        assert_eq!(outcome, DwellOutcome::Invalid);
        assert_eq!(timer.time_count(), 0.0);

        // Idempotent under repeated invalid ticks.
        timer.tick(&config, false, at(0, 0)).unwrap();
        assert_eq!(timer.time_count(), 0.0);
        assert_eq!(timer.phase(), DwellPhase::Idle);
    }

    #[test]
    fn test_movement_resets() {
        let config = dwell_config();
        let mut timer = DwellTimer::new();
        timer.tick(&config, true, at(0, 0)).unwrap();
        timer.tick(&config, true, at(10, 0)).unwrap();
        assert!(timer.time_count() > 0.0);

        let outcome = timer.tick(&config, true, at(100, 0)).unwrap();
        assert_eq!(outcome, DwellOutcome::Moved);
        assert_eq!(timer.time_count(), 0.0);
        assert_eq!(timer.last_cursor(), CursorSample::new(100, 0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = dwell_config();
        let mut timer = DwellTimer::new();
        // Exactly 60 px away is not "still".
        let outcome = timer.tick(&config, true, at(60, 0)).unwrap();
        assert_eq!(outcome, DwellOutcome::Moved);
    }

    #[test]
    fn test_disabled_in_grip_mode() {
        let config = Config::default();
        let mut timer = DwellTimer::new();
        let outcome = timer
            .tick(&config, true, || panic!("cursor read in grip mode"))
            .unwrap();
        assert_eq!(outcome, DwellOutcome::Disabled);

        let config = Config {
            do_click: false,
            use_grip_gesture: false,
            ..Config::default()
        };
        assert_eq!(
            timer.tick(&config, true, at(0, 0)).unwrap(),
            DwellOutcome::Disabled
        );
    }

    #[test]
    fn test_read_failure_leaves_state() {
        let config = dwell_config();
        let mut timer = DwellTimer::new();
        timer.tick(&config, true, at(5, 5)).unwrap();
        let before = timer.time_count();

        let result = timer.tick(&config, true, || Err(Error::Pointer("gone".into())));
        assert!(result.is_err());
        assert_eq!(timer.time_count(), before);
        assert_eq!(timer.last_cursor(), CursorSample::new(5, 5));
    }

    #[test]
    fn test_zero_hold_time_clicks_on_first_still_tick() {
        let config = Config {
            time_required: 0.0,
            ..dwell_config()
        };
        let mut timer = DwellTimer::new();
        assert_eq!(
            timer.tick(&config, true, at(0, 0)).unwrap(),
            DwellOutcome::Click
        );
    }

    #[test]
    fn test_status_sexp() {
        let timer = DwellTimer::new();
        assert_eq!(
            timer.status_sexp(),
            "(:phase idle :time-count 0.0 :last-cursor (0 0))"
        );
    }
}
