//! kinect-mouse: desktop pointer control from skeletal hand tracking.
//!
//! Frames flow from a `FrameSource` through the gesture classifier into a
//! `PointerSink`; a dwell timer runs beside them on the same event loop.

pub mod backend;
pub mod config;
pub mod cursor;
pub mod dwell;
pub mod error;
pub mod pointer;
pub mod source;
pub mod state;
pub mod tracking;

pub use error::{Error, Result};
