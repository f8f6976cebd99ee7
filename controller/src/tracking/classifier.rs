//! Gesture classification for the selected body.
//!
//! Decides which hand, if any, is reaching toward the sensor, steps that
//! hand's grip state machine and turns the resulting grip actions into
//! pointer commands.  Also owns the tracking-validity flag the dwell timer
//! consults.

use tracing::{debug, trace};

use super::body::{Body, Hand, JointType};
use super::grip::{GripAction, GripState};
use crate::config::{ClickMode, Config};

/// Right hand must be this far in front of the spine to enter its zone (meters).
pub const RIGHT_REACH_M: f32 = 0.30;
/// Left hand needs a shallower reach than the right.
pub const LEFT_REACH_M: f32 = 0.15;
/// Fixed lateral offset of the left-hand reference point from the spine.
pub const LEFT_OFFSET_X_M: f32 = 0.30;
/// Fixed vertical offset of the left-hand reference point from the spine.
pub const LEFT_OFFSET_Y_M: f32 = 0.51;

// ── Zone ───────────────────────────────────────────────────

/// Which gesture zone the hands occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Right hand pushed forward.
    Right,
    /// Left hand pushed forward (and the right one is not).
    Left,
    /// Neither hand forward.
    Neutral,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Neutral => "neutral",
        }
    }

    /// Zone decision; the right hand is checked first.
    pub fn of(body: &Body) -> Self {
        let spine_z = body.joint(JointType::SpineBase).z;
        if body.joint(JointType::HandRight).z - spine_z < -RIGHT_REACH_M {
            Self::Right
        } else if body.joint(JointType::HandLeft).z - spine_z < -LEFT_REACH_M {
            Self::Left
        } else {
            Self::Neutral
        }
    }

    fn hand(&self) -> Option<Hand> {
        match self {
            Self::Right => Some(Hand::Right),
            Self::Left => Some(Hand::Left),
            Self::Neutral => None,
        }
    }
}

/// Left-hand displacement measured from a fixed point relative to the spine.
///
/// Reported for the left grip but not used to move the cursor.
pub fn left_reference_offset(body: &Body) -> (f32, f32) {
    let hand = body.joint(JointType::HandLeft);
    let spine = body.joint(JointType::SpineBase);
    (
        hand.x - spine.x + LEFT_OFFSET_X_M,
        spine.y - hand.y + LEFT_OFFSET_Y_M,
    )
}

// ── Output ─────────────────────────────────────────────────

/// Pointer-side work produced by one classified frame, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerCommand {
    ButtonDown,
    ButtonUp,
    /// Move the cursor to the screen midpoint.
    Recenter,
    /// Feed this camera-space displacement to the cursor mapper.
    MoveBy { dx: f32, dy: f32 },
}

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// `None` when no tracked body was available.
    pub zone: Option<Zone>,
    pub commands: Vec<PointerCommand>,
    /// Tracking validity after this frame.
    pub tracking_valid: bool,
}

// ── State ──────────────────────────────────────────────────

/// Grip state for both hands plus the shared validity flag.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    left: GripState,
    right: GripState,
    tracking_valid: bool,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grip(&self, hand: Hand) -> GripState {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }

    fn grip_mut(&mut self, hand: Hand) -> &mut GripState {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn tracking_valid(&self) -> bool {
        self.tracking_valid
    }

    /// Classify the body selected for this frame.
    ///
    /// With no body, validity is cleared and nothing else runs.  Grip edges
    /// are only processed in grip click mode; the neutral zone latches both
    /// hands and clears validity regardless of mode.
    pub fn classify(&mut self, body: Option<&Body>, config: &Config) -> Classification {
        let body = match body {
            Some(body) => body,
            None => {
                self.tracking_valid = false;
                return Classification {
                    zone: None,
                    commands: Vec::new(),
                    tracking_valid: false,
                };
            }
        };

        let zone = Zone::of(body);
        let mut commands = Vec::new();

        match zone.hand() {
            Some(hand) => {
                if config.click_mode() == ClickMode::Grip {
                    self.step_hand(hand, body, &mut commands);
                }
            }
            None => {
                self.left = self.left.latch();
                self.right = self.right.latch();
                self.tracking_valid = false;
            }
        }

        trace!(zone = zone.as_str(), commands = commands.len(), "frame classified");

        Classification {
            zone: Some(zone),
            commands,
            tracking_valid: self.tracking_valid,
        }
    }

    fn step_hand(&mut self, hand: Hand, body: &Body, commands: &mut Vec<PointerCommand>) {
        let previous = self.grip(hand);
        let position = body.hand_position(hand);
        let (next, actions) = previous.step(hand, body.hand_state(hand), position);

        if !previous.is_gripping() && next.is_gripping() {
            debug!(
                "Grip engaged on {} hand, origin ({:.3}, {:.3})",
                hand.as_str(),
                position.x,
                position.y
            );
            if hand == Hand::Left {
                let (x, y) = left_reference_offset(body);
                trace!(x, y, "left hand reference offset");
            }
        } else if previous.is_gripping() && !next.is_gripping() {
            debug!("Grip released on {} hand", hand.as_str());
        }

        *self.grip_mut(hand) = next;

        for action in actions {
            match action {
                GripAction::MarkTracked => self.tracking_valid = true,
                GripAction::ButtonDown => commands.push(PointerCommand::ButtonDown),
                GripAction::ButtonUp => commands.push(PointerCommand::ButtonUp),
                GripAction::Recenter => commands.push(PointerCommand::Recenter),
                GripAction::Drag { dx, dy } => commands.push(PointerCommand::MoveBy { dx, dy }),
            }
        }
    }

    /// Return both hands to idle, keeping their origins, so the next
    /// closed hand is a fresh grip.
    pub fn release_all(&mut self) {
        self.left = self.left.release();
        self.right = self.right.release();
    }

    /// Drop both grips back to idle at the zero origin and clear validity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate s-expression for status logging.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:tracking-valid {} :left (:grip {} :origin ({:.3} {:.3})) :right (:grip {} :origin ({:.3} {:.3})))",
            if self.tracking_valid { "t" } else { "nil" },
            self.left.as_str(),
            self.left.origin().x,
            self.left.origin().y,
            self.right.as_str(),
            self.right.origin().x,
            self.right.origin().y,
        )
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn reaching_body(hand_right: (f32, f32, f32), right: super::body::HandState) -> Body {
    use super::body::{CameraPoint, HandState};

    let mut body = Body::tracked();
    body.set_joint(JointType::SpineBase, CameraPoint::new(0.0, 0.0, 0.0));
    body.set_joint(
        JointType::HandRight,
        CameraPoint::new(hand_right.0, hand_right.1, hand_right.2),
    );
    body.set_joint(JointType::HandLeft, CameraPoint::new(-0.2, 0.0, 0.0));
    body.hand_right = right;
    body.hand_left = HandState::Open;
    body
}

#[cfg(test)]
fn neutral_body() -> Body {
    reaching_body((0.2, 0.0, 0.0), super::body::HandState::Open)
}

// ── Tests ──────────────────────────────────────────────────
