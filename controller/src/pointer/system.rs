//! System pointer backed by `enigo`.
//!
//! Injects real mouse events into the desktop session.  Only compiled with
//! the `system-pointer` feature.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use tracing::info;

use super::PointerSink;
use crate::cursor::{CursorSample, ScreenSize};
use crate::error::{Error, Result};

/// Wheel steps per zoom event.
const WHEEL_STEP: i32 = 1;

pub struct SystemPointer {
    enigo: Enigo,
    screen: ScreenSize,
}

impl SystemPointer {
    /// Connect to the platform input layer.
    ///
    /// `screen` overrides the detected main display size.
    pub fn new(screen: Option<ScreenSize>) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| Error::Pointer(format!("failed to open input connection: {:?}", e)))?;

        let screen = match screen {
            Some(screen) => screen,
            None => {
                let (width, height) = enigo
                    .main_display()
                    .map_err(|e| Error::Pointer(format!("failed to query main display: {:?}", e)))?;
                ScreenSize::new(width, height)
            }
        };

        info!("System pointer ready on {}x{} screen", screen.width, screen.height);
        Ok(Self { enigo, screen })
    }
}

fn pointer_err(op: &str, e: enigo::InputError) -> Error {
    Error::Pointer(format!("{} failed: {:?}", op, e))
}

impl PointerSink for SystemPointer {
    fn position(&mut self) -> Result<CursorSample> {
        let (x, y) = self.enigo.location().map_err(|e| pointer_err("location", e))?;
        Ok(CursorSample::new(x, y))
    }

    fn set_position(&mut self, position: CursorSample) -> Result<()> {
        let position = self.screen.clamp(position);
        self.enigo
            .move_mouse(position.x, position.y, Coordinate::Abs)
            .map_err(|e| pointer_err("move", e))
    }

    fn button_down(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Press)
            .map_err(|e| pointer_err("button press", e))
    }

    fn button_up(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Release)
            .map_err(|e| pointer_err("button release", e))
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| pointer_err("click", e))
    }

    fn wheel_in(&mut self) -> Result<()> {
        self.enigo
            .scroll(-WHEEL_STEP, Axis::Vertical)
            .map_err(|e| pointer_err("scroll", e))
    }

    fn wheel_out(&mut self) -> Result<()> {
        self.enigo
            .scroll(WHEEL_STEP, Axis::Vertical)
            .map_err(|e| pointer_err("scroll", e))
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(self.screen)
    }

    fn name(&self) -> &'static str {
        "system"
    }
}
