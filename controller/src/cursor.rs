//! Cursor mapping from camera-space hand displacement to screen pixels.
//!
//! Damping is a first-order filter whose "previous" term is the pointer's
//! own reported position, so the mapper keeps no state between frames.

use crate::config::MAX_CURSOR_SMOOTHING;

// ── Screen types ───────────────────────────────────────────

/// A cursor position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorSample {
    pub x: i32,
    pub y: i32,
}

impl CursorSample {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: &CursorSample) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Integer midpoint used when recentering.
    pub fn center(&self) -> CursorSample {
        CursorSample::new(self.width / 2, self.height / 2)
    }

    /// Clamp a position to the visible area.
    pub fn clamp(&self, sample: CursorSample) -> CursorSample {
        CursorSample::new(
            sample.x.clamp(0, (self.width - 1).max(0)),
            sample.y.clamp(0, (self.height - 1).max(0)),
        )
    }
}

impl From<(i32, i32)> for ScreenSize {
    fn from((width, height): (i32, i32)) -> Self {
        Self { width, height }
    }
}

// ── Mapping ────────────────────────────────────────────────

/// Map a hand displacement onto a new absolute cursor position.
///
/// `new = current + displacement * sensitivity * screen_extent * (1 - smoothing)`,
/// rounded half away from zero.  Smoothing is clamped to `[0, 0.95]`.
pub fn map_displacement(
    dx: f32,
    dy: f32,
    sensitivity: f32,
    cursor_smoothing: f32,
    screen: ScreenSize,
    current: CursorSample,
) -> CursorSample {
    let factor = 1.0 - cursor_smoothing.clamp(0.0, MAX_CURSOR_SMOOTHING) as f64;
    let x = current.x as f64 + dx as f64 * sensitivity as f64 * screen.width as f64 * factor;
    let y = current.y as f64 + dy as f64 * sensitivity as f64 * screen.height as f64 * factor;
    CursorSample::new(to_pixel(x), to_pixel(y))
}

fn to_pixel(value: f64) -> i32 {
    if value.is_finite() {
        value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: ScreenSize = ScreenSize {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_zero_displacement_keeps_position() {
        let current = CursorSample::new(400, 300);
        for smoothing in [0.0, 0.2, 0.95] {
            assert_eq!(
                map_displacement(0.0, 0.0, 3.5, smoothing, FULL_HD, current),
                current
            );
        }
    }

    #[test]
    fn test_drag_right_with_default_smoothing() {
        // 0.1 m * 3.5 * 1920 px * 0.8 = 537.6 px.
        let current = CursorSample::new(960, 540);
        let next = map_displacement(0.1, 0.0, 3.5, 0.2, FULL_HD, current);
        assert_eq!(next, CursorSample::new(960 + 538, 540));
    }

    #[test]
    fn test_no_smoothing_is_raw() {
        let next = map_displacement(0.1, -0.1, 2.0, 0.0, FULL_HD, CursorSample::new(0, 1000));
        assert_eq!(next, CursorSample::new(384, 1000 - 216));
    }

    #[test]
    fn test_smoothing_is_clamped() {
        let clamped = map_displacement(1.0, 0.0, 1.0, 5.0, FULL_HD, CursorSample::default());
        let max = map_displacement(1.0, 0.0, 1.0, 0.95, FULL_HD, CursorSample::default());
        assert_eq!(clamped, max);
        assert_eq!(max.x, 96);
    }

    #[test]
    fn test_non_finite_input_is_total() {
        let next = map_displacement(f32::NAN, 0.0, 3.5, 0.2, FULL_HD, CursorSample::new(5, 5));
        assert_eq!(next.x, 0);
        assert_eq!(next.y, 5);
    }

    #[test]
    fn test_distance() {
        let a = CursorSample::new(0, 0);
        let b = CursorSample::new(20, 20);
        assert!((a.distance(&b) - 28.284_271).abs() < 1e-4);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_screen_center_and_clamp() {
        assert_eq!(FULL_HD.center(), CursorSample::new(960, 540));
        assert_eq!(
            FULL_HD.clamp(CursorSample::new(-5, 5000)),
            CursorSample::new(0, 1079)
        );
    }
}
