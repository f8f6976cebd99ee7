//! Synthetic gesture script for running without a sensor.
//!
//! Loops a fixed performance: nobody in view, a resting pose, a right-hand
//! grip and drag, a release, a two-hand spread, hands brought together, a
//! dropped acquisition, and a left-hand grip.

use std::time::Duration;

use tracing::info;

use super::{FramePump, FrameSender, FrameSource};
use crate::error::Result;
use crate::tracking::{Body, CameraPoint, Frame, FrameEvent, HandState, JointType};

/// Spine depth used by every scripted pose (meters from the sensor).
const SPINE_Z: f32 = 2.0;
/// Depth of a hand pushed forward far enough for either zone.
const REACH_Z: f32 = SPINE_Z - 0.5;
/// Depth of a resting hand.
const REST_Z: f32 = SPINE_Z - 0.1;

/// Frame source replaying a built-in gesture loop.
#[derive(Debug)]
pub struct ScriptedSource {
    interval: Duration,
    repeat: bool,
    pump: Option<FramePump>,
}

impl ScriptedSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            repeat: true,
            pump: None,
        }
    }

    /// Play the script once and then close the channel.
    pub fn once(mut self) -> Self {
        self.repeat = false;
        self
    }

    /// One pass of the script.
    pub fn script() -> Vec<FrameEvent> {
        let mut events = Vec::new();
        let open = HandState::Open;
        let closed = HandState::Closed;

        // Nobody in view.
        events.extend(std::iter::repeat(FrameEvent::Frame(Frame::default())).take(15));

        // Resting.
        push(&mut events, 20, |_| rest_pose());

        // Right hand forward, open.
        push(&mut events, 10, |_| {
            pose((-0.18, 0.0, REST_Z), open, (0.2, 0.1, REACH_Z), open)
        });

        // Grip and drag right by 3 cm.
        push(&mut events, 30, |i| {
            let x = 0.2 + 0.03 * i as f32 / 29.0;
            pose((-0.18, 0.0, REST_Z), open, (x, 0.1, REACH_Z), closed)
        });

        // Release.
        push(&mut events, 10, |_| {
            pose((-0.18, 0.0, REST_Z), open, (0.23, 0.1, REACH_Z), open)
        });

        push(&mut events, 20, |_| rest_pose());

        // Hands stretched outward.
        push(&mut events, 20, |_| {
            pose((-0.6, 0.0, REST_Z), open, (0.6, 0.0, REST_Z), open)
        });

        // Hands brought together.
        push(&mut events, 20, |_| {
            pose((-0.05, 0.0, REST_Z), open, (0.05, 0.0, REST_Z), open)
        });

        events.push(FrameEvent::Dropped);

        // Left hand forward: grip, then open.
        push(&mut events, 10, |_| {
            pose((-0.18, 0.0, REACH_Z), closed, (0.18, 0.0, REST_Z), open)
        });
        push(&mut events, 10, |_| {
            pose((-0.18, 0.0, REACH_Z), open, (0.18, 0.0, REST_Z), open)
        });

        push(&mut events, 20, |_| rest_pose());

        events
    }
}

impl FrameSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn open(&mut self, tx: FrameSender) -> Result<()> {
        self.close();
        let script = Self::script();
        info!(
            frames = script.len(),
            repeat = self.repeat,
            "scripted gesture source"
        );

        let step_ns = self.interval.as_nanos() as u64;
        let stamp = move |(i, event): (usize, FrameEvent)| match event {
            FrameEvent::Frame(frame) => {
                FrameEvent::Frame(Frame::new(frame.bodies, step_ns.saturating_mul(i as u64)))
            }
            FrameEvent::Dropped => FrameEvent::Dropped,
        };

        let pump = if self.repeat {
            let frames = script.into_iter().cycle().enumerate().map(stamp);
            FramePump::spawn("scripted", self.interval, frames, tx)?
        } else {
            let frames = script.into_iter().enumerate().map(stamp);
            FramePump::spawn("scripted", self.interval, frames, tx)?
        };
        self.pump = Some(pump);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut pump) = self.pump.take() {
            pump.stop();
        }
    }
}

fn push(events: &mut Vec<FrameEvent>, count: usize, make: impl Fn(usize) -> FrameEvent) {
    events.extend((0..count).map(make));
}

fn rest_pose() -> FrameEvent {
    pose(
        (-0.18, 0.0, REST_Z),
        HandState::Open,
        (0.18, 0.0, REST_Z),
        HandState::Open,
    )
}

fn pose(
    hand_left: (f32, f32, f32),
    left: HandState,
    hand_right: (f32, f32, f32),
    right: HandState,
) -> FrameEvent {
    let mut body = Body::tracked();
    body.set_joint(JointType::SpineBase, CameraPoint::new(0.0, -0.3, SPINE_Z));
    body.set_joint(JointType::ElbowLeft, CameraPoint::new(-0.2, -0.1, SPINE_Z));
    body.set_joint(JointType::ElbowRight, CameraPoint::new(0.2, -0.1, SPINE_Z));
    body.set_joint(
        JointType::HandLeft,
        CameraPoint::new(hand_left.0, hand_left.1, hand_left.2),
    );
    body.set_joint(
        JointType::HandRight,
        CameraPoint::new(hand_right.0, hand_right.1, hand_right.2),
    );
    body.hand_left = left;
    body.hand_right = right;
    FrameEvent::Frame(Frame::new(vec![body], 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tracking::{zoom, GestureClassifier, PointerCommand, ZoomGesture, Zone};

    #[test]
    fn test_script_exercises_every_gesture() {
        let config = Config::default();
        let mut classifier = GestureClassifier::new();
        let mut zones = Vec::new();
        let mut commands = Vec::new();
        let mut zooms = Vec::new();
        let mut dropped = 0;

        for event in ScriptedSource::script() {
            if event == FrameEvent::Dropped {
                dropped += 1;
            }
            let body = event.selected_body();
            let result = classifier.classify(body, &config);
            zones.extend(result.zone);
            commands.extend(result.commands);
            zooms.extend(body.and_then(zoom::detect));
        }

        assert_eq!(dropped, 1);
        for zone in [Zone::Right, Zone::Left, Zone::Neutral] {
            assert!(zones.contains(&zone), "zone {} never reached", zone.as_str());
        }
        assert!(commands.contains(&PointerCommand::ButtonDown));
        assert!(commands.contains(&PointerCommand::ButtonUp));
        assert!(commands.contains(&PointerCommand::Recenter));
        assert!(commands
            .iter()
            .any(|c| matches!(c, PointerCommand::MoveBy { dx, .. } if *dx > 0.02)));
        assert_eq!(zooms.iter().filter(|z| **z == ZoomGesture::Out).count(), 20);
        assert_eq!(zooms.iter().filter(|z| **z == ZoomGesture::In).count(), 20);
    }

    #[test]
    fn test_resting_pose_is_quiet() {
        let event = rest_pose();
        let body = event.selected_body().unwrap();
        assert_eq!(Zone::of(body), Zone::Neutral);
        assert_eq!(zoom::detect(body), None);
    }

    #[test]
    fn test_open_once_and_close() {
        let mut source = ScriptedSource::new(Duration::ZERO).once();
        let (tx, _rx) = calloop::channel::channel();
        source.open(tx).unwrap();
        source.close();
    }
}
