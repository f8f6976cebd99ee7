//! Skeletal tracking: frame model, grip state machines, gesture
//! classification and the zoom detector.

pub mod body;
pub mod classifier;
pub mod grip;
pub mod zoom;

pub use body::{Body, CameraPoint, Frame, FrameEvent, Hand, HandState, JointType};
pub use classifier::{Classification, GestureClassifier, PointerCommand, Zone};
pub use grip::{Anchor, GripAction, GripState};
pub use zoom::ZoomGesture;
