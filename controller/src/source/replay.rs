//! Recorded-frame replay.
//!
//! One s-expression per line.  A line is either a single body plist, a
//! multi-body frame, or a dropped acquisition:
//!
//! ```text
//! ; right hand forward and closed
//! (:tracked t :left open :right closed :hand-right (0.5 0.2 -0.5) :spine-base (0 0 0))
//! (:bodies ((:tracked nil) (:right open :hand-right (0.1 0 0))) :timestamp 1200)
//! (:dropped t)
//! ```
//!
//! Joint keys are `hand-left`, `hand-right`, `elbow-left`, `elbow-right`
//! and `spine-base`, each an `(x y z)` list in meters.  Missing joints sit
//! at the origin, missing hand states are `unknown`, and bodies are
//! tracked unless `:tracked nil`.  Blank lines and `;` comments are
//! skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lexpr::Value;
use tracing::info;

use super::{FramePump, FrameSender, FrameSource};
use crate::error::{Error, Result};
use crate::tracking::{Body, CameraPoint, Frame, FrameEvent, HandState, JointType};

/// Frame source that plays back a recording file once.
///
/// The channel closes after the last frame, which ends the session.
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    interval: Duration,
    pump: Option<FramePump>,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            pump: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse a recording.
    pub fn load(path: &Path, interval: Duration) -> Result<Vec<FrameEvent>> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::SensorUnavailable(format!("cannot read recording {}: {}", path.display(), e))
        })?;
        parse_recording(path, &text, interval)
    }
}

impl FrameSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn open(&mut self, tx: FrameSender) -> Result<()> {
        self.close();
        let events = Self::load(&self.path, self.interval)?;
        info!(
            path = %self.path.display(),
            frames = events.len(),
            "replay loaded"
        );
        self.pump = Some(FramePump::spawn(
            "replay",
            self.interval,
            events.into_iter(),
            tx,
        )?);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut pump) = self.pump.take() {
            pump.stop();
        }
    }
}

// ── Parsing ────────────────────────────────────────────────

/// Parse a whole recording.  Frames without `:timestamp` are stamped by
/// their position times `interval`.
pub fn parse_recording(path: &Path, text: &str, interval: Duration) -> Result<Vec<FrameEvent>> {
    let step_ns = interval.as_nanos() as u64;
    let mut events = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let default_ts = step_ns.saturating_mul(events.len() as u64);
        let event = parse_line(line, default_ts).map_err(|reason| Error::Replay {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        events.push(event);
    }

    Ok(events)
}

/// Parse one non-empty recording line.
pub fn parse_line(line: &str, default_timestamp_ns: u64) -> std::result::Result<FrameEvent, String> {
    let value = lexpr::from_str(line).map_err(|e| format!("malformed s-expression: {}", e))?;

    if let Some(dropped) = get_value(&value, "dropped") {
        if parse_bool(dropped)? {
            return Ok(FrameEvent::Dropped);
        }
    }

    let timestamp_ns = match get_value(&value, "timestamp") {
        Some(v) => parse_number(v)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u64)
            .ok_or_else(|| format!("bad :timestamp {}", v))?,
        None => default_timestamp_ns,
    };

    let bodies = match get_value(&value, "bodies") {
        Some(list) => list_items(list)
            .ok_or_else(|| "':bodies' must be a list".to_string())?
            .into_iter()
            .map(parse_body)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => vec![parse_body(&value)?],
    };

    Ok(FrameEvent::Frame(Frame::new(bodies, timestamp_ns)))
}

fn parse_body(value: &Value) -> std::result::Result<Body, String> {
    let mut body = Body::tracked();

    if let Some(v) = get_value(value, "tracked") {
        body.tracked = parse_bool(v)?;
    }
    if let Some(v) = get_value(value, "left") {
        body.hand_left = parse_hand_state(v)?;
    }
    if let Some(v) = get_value(value, "right") {
        body.hand_right = parse_hand_state(v)?;
    }
    for joint in JointType::all() {
        if let Some(v) = get_value(value, joint.as_str()) {
            let point = parse_point(v).ok_or_else(|| {
                format!(":{} must be an (x y z) list, got {}", joint.as_str(), v)
            })?;
            body.set_joint(joint, point);
        }
    }

    Ok(body)
}

/// Look up a plist value by key, accepting both `:key` symbols and keywords.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Elements of a proper list, or `None` for anything else.
fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            _ => return None,
        }
    }
}

fn symbol_name(value: &Value) -> Option<&str> {
    match value {
        Value::Symbol(s) => {
            let s: &str = s.as_ref();
            Some(s.strip_prefix(':').unwrap_or(s))
        }
        Value::Keyword(k) => Some(k.as_ref()),
        Value::String(s) => Some(s.as_ref()),
        _ => None,
    }
}

fn parse_bool(value: &Value) -> std::result::Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Nil | Value::Null => Ok(false),
        other => match symbol_name(other) {
            Some("t") => Ok(true),
            Some("nil") => Ok(false),
            _ => Err(format!("expected t or nil, got {}", other)),
        },
    }
}

fn parse_hand_state(value: &Value) -> std::result::Result<HandState, String> {
    symbol_name(value)
        .and_then(HandState::from_str)
        .ok_or_else(|| format!("unknown hand state {}", value))
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn parse_point(value: &Value) -> Option<CameraPoint> {
    let items = list_items(value)?;
    if items.len() != 3 {
        return None;
    }
    let x = parse_number(items[0])?;
    let y = parse_number(items[1])?;
    let z = parse_number(items[2])?;
    Some(CameraPoint::new(x as f32, y as f32, z as f32))
}

// ── Tests ──────────────────────────────────────────────────
