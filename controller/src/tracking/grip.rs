//! Per-hand grip state machine.
//!
//! Each hand is either idle or gripping.  Transitions are pure: `step`
//! takes the current state and the sensor's hand state for this frame and
//! returns the next state together with the pointer-side actions the edge
//! produced.  Nothing here touches the pointer.

use super::body::{CameraPoint, Hand, HandState};

// ── Anchor ─────────────────────────────────────────────────

/// Camera-space (x, y) recorded when a grip engages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<CameraPoint> for Anchor {
    fn from(p: CameraPoint) -> Self {
        Self { x: p.x, y: p.y }
    }
}

// ── Actions ────────────────────────────────────────────────

/// Side effects requested by a grip transition, in emission order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GripAction {
    /// This hand is now driving the cursor; dwell timing becomes meaningful.
    MarkTracked,
    ButtonDown,
    ButtonUp,
    /// Move the cursor to the screen midpoint.
    Recenter,
    /// Camera-space displacement of the hand from its grip origin.
    Drag { dx: f32, dy: f32 },
}

// ── State ──────────────────────────────────────────────────

/// Grip state of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GripState {
    /// Not gripping.  Keeps the most recent origin so a latch can resume it.
    Idle { last_origin: Anchor },
    /// Button held; displacement is measured from `origin`.
    Gripping { origin: Anchor },
}

impl Default for GripState {
    fn default() -> Self {
        Self::Idle {
            last_origin: Anchor::default(),
        }
    }
}

impl GripState {
    pub fn is_gripping(&self) -> bool {
        matches!(self, Self::Gripping { .. })
    }

    /// The active origin while gripping, or the last recorded one.
    pub fn origin(&self) -> Anchor {
        match *self {
            Self::Idle { last_origin } => last_origin,
            Self::Gripping { origin } => origin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Gripping { .. } => "gripping",
        }
    }

    /// Advance on this frame's hand state.
    ///
    /// The origin is written only on the idle → gripping edge.  Only the
    /// right hand reports drag displacement; the left hand toggles the
    /// button and otherwise leaves the cursor alone.  The left release
    /// recenters before lifting the button, the right one after.
    pub fn step(
        self,
        hand: Hand,
        hand_state: HandState,
        position: CameraPoint,
    ) -> (Self, Vec<GripAction>) {
        let mut actions = Vec::new();

        let next = match (self, hand_state) {
            (Self::Idle { .. }, HandState::Closed) => {
                let origin = Anchor::from(position);
                actions.push(GripAction::MarkTracked);
                actions.push(GripAction::ButtonDown);
                Self::Gripping { origin }
            }
            (Self::Gripping { origin }, HandState::Open) => {
                match hand {
                    Hand::Right => {
                        actions.push(GripAction::ButtonUp);
                        actions.push(GripAction::Recenter);
                    }
                    Hand::Left => {
                        actions.push(GripAction::Recenter);
                        actions.push(GripAction::ButtonUp);
                    }
                }
                Self::Idle {
                    last_origin: origin,
                }
            }
            (state, _) => state,
        };

        if let (Self::Gripping { origin }, HandState::Closed, Hand::Right) =
            (next, hand_state, hand)
        {
            actions.push(GripAction::Drag {
                dx: position.x - origin.x,
                dy: position.y - origin.y,
            });
        }

        (next, actions)
    }

    /// Force the gripping state without emitting anything.
    ///
    /// Used when both hands leave their zones: whatever the hand does on
    /// re-entry is judged against a held grip, so opening it releases a
    /// button that may still be down.
    pub fn latch(self) -> Self {
        match self {
            Self::Idle { last_origin } => Self::Gripping {
                origin: last_origin,
            },
            gripping => gripping,
        }
    }

    /// Drop to idle without emitting anything, keeping the origin.
    pub fn release(self) -> Self {
        Self::Idle {
            last_origin: self.origin(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> CameraPoint {
        CameraPoint::new(x, y, -0.5)
    }

    #[test]
    fn test_default_is_idle_at_zero() {
        let state = GripState::default();
        assert!(!state.is_gripping());
        assert_eq!(state.origin(), Anchor::new(0.0, 0.0));
    }

    #[test]
    fn test_rising_edge_records_origin() {
        let (next, actions) =
            GripState::default().step(Hand::Right, HandState::Closed, p(0.5, 0.2));
        assert_eq!(
            next,
            GripState::Gripping {
                origin: Anchor::new(0.5, 0.2)
            }
        );
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0], GripAction::MarkTracked);
        assert_eq!(actions[1], GripAction::ButtonDown);
        assert_eq!(actions[2], GripAction::Drag { dx: 0.0, dy: 0.0 });
    }

    #[test]
    fn test_origin_unchanged_while_gripping() {
        let (state, _) = GripState::default().step(Hand::Right, HandState::Closed, p(0.5, 0.2));
        let (state, actions) = state.step(Hand::Right, HandState::Closed, p(0.6, 0.2));
        let (state, _) = state.step(Hand::Right, HandState::Closed, p(0.9, -0.4));

        assert_eq!(state.origin(), Anchor::new(0.5, 0.2));
        assert_eq!(actions.len(), 1);
        match actions[0] {
            GripAction::Drag { dx, dy } => {
                assert!((dx - 0.1).abs() < 1e-6, "dx = {}", dx);
                assert!(dy.abs() < 1e-6);
            }
            other => panic!("expected drag, got {:?}", other),
        }
    }

    #[test]
    fn test_right_release_order() {
        let (state, _) = GripState::default().step(Hand::Right, HandState::Closed, p(0.5, 0.2));
        let (state, actions) = state.step(Hand::Right, HandState::Open, p(0.6, 0.2));
        assert_eq!(actions, vec![GripAction::ButtonUp, GripAction::Recenter]);
        assert_eq!(
            state,
            GripState::Idle {
                last_origin: Anchor::new(0.5, 0.2)
            }
        );

        // Releasing twice does nothing.
        let (_, actions) = state.step(Hand::Right, HandState::Open, p(0.6, 0.2));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_left_hand_never_drags() {
        let (state, actions) = GripState::default().step(Hand::Left, HandState::Closed, p(-0.3, 0.1));
        assert_eq!(actions, vec![GripAction::MarkTracked, GripAction::ButtonDown]);

        let (state, actions) = state.step(Hand::Left, HandState::Closed, p(-0.1, 0.4));
        assert!(actions.is_empty());

        let (_, actions) = state.step(Hand::Left, HandState::Open, p(-0.1, 0.4));
        assert_eq!(actions, vec![GripAction::Recenter, GripAction::ButtonUp]);
    }

    #[test]
    fn test_unknown_and_not_tracked_hold_state() {
        let (gripping, _) = GripState::default().step(Hand::Right, HandState::Closed, p(0.5, 0.2));
        for hand_state in [HandState::Unknown, HandState::NotTracked] {
            let (next, actions) = gripping.step(Hand::Right, hand_state, p(0.7, 0.7));
            assert_eq!(next, gripping);
            assert!(actions.is_empty());

            let (next, actions) = GripState::default().step(Hand::Right, hand_state, p(0.7, 0.7));
            assert_eq!(next, GripState::default());
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn test_latch_resumes_last_origin() {
        let (state, _) = GripState::default().step(Hand::Right, HandState::Closed, p(0.5, 0.2));
        let (state, _) = state.step(Hand::Right, HandState::Open, p(0.5, 0.2));
        let latched = state.latch();
        assert!(latched.is_gripping());
        assert_eq!(latched.origin(), Anchor::new(0.5, 0.2));

        // A closed hand after a latch is not a fresh edge: no button down.
        let (_, actions) = latched.step(Hand::Right, HandState::Closed, p(0.55, 0.2));
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], GripAction::Drag { .. }));

        // Opening after a latch releases.
        let (next, actions) = latched.step(Hand::Right, HandState::Open, p(0.5, 0.2));
        assert!(!next.is_gripping());
        assert_eq!(actions, vec![GripAction::ButtonUp, GripAction::Recenter]);
    }

    #[test]
    fn test_latch_is_idempotent() {
        let (state, _) = GripState::default().step(Hand::Left, HandState::Closed, p(0.1, 0.1));
        assert_eq!(state.latch(), state);
        assert_eq!(state.latch().latch(), state);
    }

    #[test]
    fn test_release_keeps_origin() {
        let (gripping, _) = GripState::default().step(Hand::Right, HandState::Closed, p(0.4, 0.1));
        let idle = gripping.release();
        assert!(!idle.is_gripping());
        assert_eq!(idle.origin(), gripping.origin());

        let (_, actions) = idle.step(Hand::Right, HandState::Closed, p(0.4, 0.1));
        assert_eq!(actions[1], GripAction::ButtonDown);
    }
}
