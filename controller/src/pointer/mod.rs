//! Pointer sinks: where cursor moves, button presses and wheel steps go.
//!
//! The recording sink is always compiled and backs tests and headless
//! runs.  The system sink injects real input events and is only built with
//! the `system-pointer` feature.

pub mod recording;
#[cfg(feature = "system-pointer")]
pub mod system;

pub use recording::RecordingPointer;
#[cfg(feature = "system-pointer")]
pub use system::SystemPointer;

use crate::cursor::{CursorSample, ScreenSize};
use crate::error::Result;

// ── Actions ────────────────────────────────────────────────

/// One primitive pointer operation, as recorded by `RecordingPointer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    MoveTo { x: i32, y: i32 },
    ButtonDown,
    ButtonUp,
    Click,
    WheelIn,
    WheelOut,
}

impl PointerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move-to",
            Self::ButtonDown => "button-down",
            Self::ButtonUp => "button-up",
            Self::Click => "click",
            Self::WheelIn => "wheel-in",
            Self::WheelOut => "wheel-out",
        }
    }
}

// ── Sink trait ─────────────────────────────────────────────

/// Destination for pointer events.
///
/// Every call may fail with `Error::Pointer`; callers log the failure and
/// carry on with the next frame.
pub trait PointerSink {
    /// Current absolute cursor position.
    fn position(&mut self) -> Result<CursorSample>;

    /// Move the cursor to an absolute position.
    fn set_position(&mut self, position: CursorSample) -> Result<()>;

    /// Press the primary button.
    fn button_down(&mut self) -> Result<()>;

    /// Release the primary button.
    fn button_up(&mut self) -> Result<()>;

    /// Press and release the primary button.
    fn click(&mut self) -> Result<()>;

    /// One wheel step toward zooming in.
    fn wheel_in(&mut self) -> Result<()>;

    /// One wheel step toward zooming out.
    fn wheel_out(&mut self) -> Result<()>;

    /// Size of the screen the cursor moves on.
    fn screen_size(&self) -> Result<ScreenSize>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

impl<P: PointerSink + ?Sized> PointerSink for Box<P> {
    fn position(&mut self) -> Result<CursorSample> {
        (**self).position()
    }

    fn set_position(&mut self, position: CursorSample) -> Result<()> {
        (**self).set_position(position)
    }

    fn button_down(&mut self) -> Result<()> {
        (**self).button_down()
    }

    fn button_up(&mut self) -> Result<()> {
        (**self).button_up()
    }

    fn click(&mut self) -> Result<()> {
        (**self).click()
    }

    fn wheel_in(&mut self) -> Result<()> {
        (**self).wheel_in()
    }

    fn wheel_out(&mut self) -> Result<()> {
        (**self).wheel_out()
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        (**self).screen_size()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
