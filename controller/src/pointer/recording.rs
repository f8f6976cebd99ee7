//! In-memory pointer that records every operation.
//!
//! Keeps its own cursor clamped to the configured screen, so the cursor
//! mapper sees the same feedback loop it would get from a real display.

use tracing::trace;

use super::{PointerAction, PointerSink};
use crate::cursor::{CursorSample, ScreenSize};
use crate::error::{Error, Result};

/// Virtual pointer for headless runs and tests.
#[derive(Debug, Clone)]
pub struct RecordingPointer {
    screen: ScreenSize,
    position: CursorSample,
    button_held: bool,
    actions: Vec<PointerAction>,
    keep_history: bool,
    /// When set, every call fails with this message.
    failure: Option<String>,
}

impl Default for RecordingPointer {
    fn default() -> Self {
        Self::new(ScreenSize::default())
    }
}

impl RecordingPointer {
    /// A pointer resting at the screen center.
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            position: screen.center(),
            button_held: false,
            actions: Vec::new(),
            keep_history: true,
            failure: None,
        }
    }

    /// Track the cursor without keeping an action log, for long headless
    /// sessions.
    pub fn without_history(mut self) -> Self {
        self.keep_history = false;
        self
    }

    pub fn actions(&self) -> &[PointerAction] {
        &self.actions
    }

    /// Remove and return everything recorded so far.
    pub fn take_actions(&mut self) -> Vec<PointerAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn current(&self) -> CursorSample {
        self.position
    }

    pub fn is_button_held(&self) -> bool {
        self.button_held
    }

    /// Make every subsequent call fail (`Some`) or succeed again (`None`).
    pub fn set_failure(&mut self, failure: Option<&str>) {
        self.failure = failure.map(str::to_string);
    }

    /// Count of recorded actions matching `action`, ignoring move targets.
    pub fn count(&self, action: PointerAction) -> usize {
        self.actions
            .iter()
            .filter(|a| std::mem::discriminant(*a) == std::mem::discriminant(&action))
            .count()
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(Error::Pointer(reason.clone())),
            None => Ok(()),
        }
    }

    fn record(&mut self, action: PointerAction) {
        trace!(action = action.as_str(), "virtual pointer");
        if self.keep_history {
            self.actions.push(action);
        }
    }
}

impl PointerSink for RecordingPointer {
    fn position(&mut self) -> Result<CursorSample> {
        self.check()?;
        Ok(self.position)
    }

    fn set_position(&mut self, position: CursorSample) -> Result<()> {
        self.check()?;
        self.position = self.screen.clamp(position);
        self.record(PointerAction::MoveTo {
            x: self.position.x,
            y: self.position.y,
        });
        Ok(())
    }

    fn button_down(&mut self) -> Result<()> {
        self.check()?;
        self.button_held = true;
        self.record(PointerAction::ButtonDown);
        Ok(())
    }

    fn button_up(&mut self) -> Result<()> {
        self.check()?;
        self.button_held = false;
        self.record(PointerAction::ButtonUp);
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.check()?;
        self.record(PointerAction::Click);
        Ok(())
    }

    fn wheel_in(&mut self) -> Result<()> {
        self.check()?;
        self.record(PointerAction::WheelIn);
        Ok(())
    }

    fn wheel_out(&mut self) -> Result<()> {
        self.check()?;
        self.record(PointerAction::WheelOut);
        Ok(())
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(self.screen)
    }

    fn name(&self) -> &'static str {
        "virtual"
    }
}
