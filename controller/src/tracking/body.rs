//! Skeletal frame data structures and body selection.
//!
//! Models the five joints the controller consults plus the per-hand
//! open/closed state reported by the sensor.  Coordinates are camera space
//! in meters; z grows away from the sensor, so a hand pushed forward has a
//! smaller z than the spine.

// ── Joint definitions ──────────────────────────────────────

/// Joints read from each tracked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    HandLeft,
    HandRight,
    ElbowLeft,
    ElbowRight,
    SpineBase,
}

/// Total number of joints per body.
pub const JOINT_COUNT: usize = 5;

impl JointType {
    /// Convert joint enum to array index (0-4).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logs and recorded frames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandLeft => "hand-left",
            Self::HandRight => "hand-right",
            Self::ElbowLeft => "elbow-left",
            Self::ElbowRight => "elbow-right",
            Self::SpineBase => "spine-base",
        }
    }

    pub fn all() -> [JointType; JOINT_COUNT] {
        [
            Self::HandLeft,
            Self::HandRight,
            Self::ElbowLeft,
            Self::ElbowRight,
            Self::SpineBase,
        ]
    }
}

// ── Hand enum ──────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Open/closed classification the sensor reports for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandState {
    Open,
    Closed,
    #[default]
    Unknown,
    NotTracked,
}

impl HandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
            Self::NotTracked => "not-tracked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "unknown" => Some(Self::Unknown),
            "not-tracked" => Some(Self::NotTracked),
            _ => None,
        }
    }
}

// ── Joint position ─────────────────────────────────────────

/// A point in camera space, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ── Body ───────────────────────────────────────────────────

/// One body slot from a skeletal frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Whether the sensor is currently tracking this body.
    pub tracked: bool,
    /// Joint positions indexed by `JointType`.
    pub joints: [CameraPoint; JOINT_COUNT],
    pub hand_left: HandState,
    pub hand_right: HandState,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            tracked: false,
            joints: [CameraPoint::default(); JOINT_COUNT],
            hand_left: HandState::NotTracked,
            hand_right: HandState::NotTracked,
        }
    }
}

impl Body {
    /// A tracked body with all joints at the camera origin and unknown hands.
    pub fn tracked() -> Self {
        Self {
            tracked: true,
            hand_left: HandState::Unknown,
            hand_right: HandState::Unknown,
            ..Self::default()
        }
    }

    pub fn joint(&self, joint: JointType) -> CameraPoint {
        self.joints[joint.index()]
    }

    pub fn set_joint(&mut self, joint: JointType, point: CameraPoint) {
        self.joints[joint.index()] = point;
    }

    pub fn hand_state(&self, hand: Hand) -> HandState {
        match hand {
            Hand::Left => self.hand_left,
            Hand::Right => self.hand_right,
        }
    }

    pub fn hand_position(&self, hand: Hand) -> CameraPoint {
        match hand {
            Hand::Left => self.joint(JointType::HandLeft),
            Hand::Right => self.joint(JointType::HandRight),
        }
    }
}

// ── Frame ──────────────────────────────────────────────────

/// A snapshot of all body slots delivered by the frame source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Body slots in sensor order.
    pub bodies: Vec<Body>,
    /// Source timestamp in nanoseconds.
    pub timestamp_ns: u64,
}

impl Frame {
    pub fn new(bodies: Vec<Body>, timestamp_ns: u64) -> Self {
        Self {
            bodies,
            timestamp_ns,
        }
    }

    /// Body selector: the first tracked body in frame order, if any.
    pub fn first_tracked(&self) -> Option<&Body> {
        self.bodies.iter().find(|body| body.tracked)
    }
}

/// What a frame-arrival notification carries.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A frame was acquired.
    Frame(Frame),
    /// The notification fired but no frame data could be acquired.
    Dropped,
}

impl FrameEvent {
    /// Select the body the controller should consult for this event.
    ///
    /// A dropped acquisition selects nothing, exactly like a frame with no
    /// tracked body.
    pub fn selected_body(&self) -> Option<&Body> {
        match self {
            Self::Frame(frame) => frame.first_tracked(),
            Self::Dropped => None,
        }
    }
}

#[cfg(test)]
fn test_body(tracked: bool, spine_x: f32) -> Body {
    let mut body = Body {
        tracked,
        ..Body::default()
    };
    body.set_joint(JointType::SpineBase, CameraPoint::new(spine_x, 0.0, 2.0));
    body
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index() {
        assert_eq!(JointType::HandLeft.index(), 0);
        assert_eq!(JointType::SpineBase.index(), 4);
        for (i, joint) in JointType::all().iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_first_tracked_skips_untracked() {
        let frame = Frame::new(
            vec![
                test_body(false, 1.0),
                test_body(true, 2.0),
                test_body(true, 3.0),
            ],
            0,
        );
        let body = frame.first_tracked().unwrap();
        assert!((body.joint(JointType::SpineBase).x - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_first_tracked_none() {
        let frame = Frame::new(vec![test_body(false, 0.0), test_body(false, 0.0)], 0);
        assert!(frame.first_tracked().is_none());
        assert!(Frame::default().first_tracked().is_none());
    }

    #[test]
    fn test_dropped_selects_nothing() {
        assert!(FrameEvent::Dropped.selected_body().is_none());
        let event = FrameEvent::Frame(Frame::new(vec![test_body(true, 0.0)], 7));
        assert!(event.selected_body().is_some());
    }

    #[test]
    fn test_hand_accessors() {
        let mut body = Body::tracked();
        body.hand_right = HandState::Closed;
        body.set_joint(JointType::HandRight, CameraPoint::new(0.5, 0.2, -0.5));
        assert_eq!(body.hand_state(Hand::Right), HandState::Closed);
        assert_eq!(body.hand_state(Hand::Left), HandState::Unknown);
        assert_eq!(body.hand_position(Hand::Right), CameraPoint::new(0.5, 0.2, -0.5));
    }

    #[test]
    fn test_hand_state_str_round_trip() {
        for state in [
            HandState::Open,
            HandState::Closed,
            HandState::Unknown,
            HandState::NotTracked,
        ] {
            assert_eq!(HandState::from_str(state.as_str()), Some(state));
        }
        assert_eq!(HandState::from_str("lasso"), None);
    }
}
