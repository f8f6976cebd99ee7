//! Two-hand zoom gesture from elbow and hand lateral separation.

use super::body::{Body, JointType};

/// Hands must spread this much wider than the elbows to zoom out (meters).
pub const SPREAD_MARGIN_M: f32 = 0.1;
/// Hands closer than this zoom in (meters).
pub const CLOSE_HANDS_M: f32 = 0.15;

/// Zoom direction recognized in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomGesture {
    /// Hands brought together.
    In,
    /// Hands stretched outward past both elbows.
    Out,
}

impl ZoomGesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "zoom-in",
            Self::Out => "zoom-out",
        }
    }
}

/// Whether the hands are spread wider than the elbows on both sides.
pub fn is_spread(body: &Body) -> bool {
    let hand_left = body.joint(JointType::HandLeft).x;
    let hand_right = body.joint(JointType::HandRight).x;
    let elbow_left = body.joint(JointType::ElbowLeft).x;
    let elbow_right = body.joint(JointType::ElbowRight).x;

    (elbow_right - elbow_left + SPREAD_MARGIN_M) < (hand_right - hand_left)
        && elbow_left > hand_left
        && elbow_right < hand_right
}

/// Whether the hands are close together.
pub fn is_pinched(body: &Body) -> bool {
    let hand_left = body.joint(JointType::HandLeft).x;
    let hand_right = body.joint(JointType::HandRight).x;
    (hand_right - hand_left) < CLOSE_HANDS_M
}

/// Classify the frame's zoom gesture.  At most one per frame; a spread
/// takes priority.
pub fn detect(body: &Body) -> Option<ZoomGesture> {
    if is_spread(body) {
        Some(ZoomGesture::Out)
    } else if is_pinched(body) {
        Some(ZoomGesture::In)
    } else {
        None
    }
}

#[cfg(test)]
fn arms(elbow_left: f32, elbow_right: f32, hand_left: f32, hand_right: f32) -> Body {
    use super::body::CameraPoint;

    let mut body = Body::tracked();
    body.set_joint(JointType::ElbowLeft, CameraPoint::new(elbow_left, 0.0, 2.0));
    body.set_joint(JointType::ElbowRight, CameraPoint::new(elbow_right, 0.0, 2.0));
    body.set_joint(JointType::HandLeft, CameraPoint::new(hand_left, 0.0, 2.0));
    body.set_joint(JointType::HandRight, CameraPoint::new(hand_right, 0.0, 2.0));
    body
}

// ── Tests ──────────────────────────────────────────────────
