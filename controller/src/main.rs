//! kinect-mouse - hand-gesture pointer control
//!
//! Reads skeletal frames, turns reach-and-grip gestures into cursor moves
//! and button presses, dwell into clicks, and two-hand stretches into
//! wheel zoom.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use kinect_mouse::backend::{Backend, BackendConfig};
use kinect_mouse::config::{self, Config};
use kinect_mouse::cursor::ScreenSize;
use kinect_mouse::pointer::{PointerSink, RecordingPointer};
use kinect_mouse::source::{FrameSource, ReplaySource, ScriptedSource};
use kinect_mouse::state::ControllerState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kinect-mouse", about = "Skeletal-tracking gesture mouse")]
struct Cli {
    /// Frame source: scripted or replay
    #[arg(long, default_value = "scripted")]
    source: String,

    /// Recorded frames to play with --source replay
    #[arg(long)]
    replay_file: Option<PathBuf>,

    /// Pointer sink: virtual or system
    #[arg(long, default_value = "virtual")]
    pointer: String,

    /// Screen size override, WxH (default: ask the pointer sink)
    #[arg(long)]
    screen: Option<String>,

    /// Cursor gain on hand displacement
    #[arg(long, default_value_t = config::MOUSE_SENSITIVITY)]
    mouse_sensitivity: f32,

    /// Seconds the cursor must hold still for a dwell click
    #[arg(long, default_value_t = config::TIME_REQUIRED)]
    time_required: f32,

    /// Dwell radius in pixels
    #[arg(long, default_value_t = config::PAUSE_THRESHOLD)]
    pause_threshold: f32,

    /// Produce button events at all
    #[arg(long, default_value_t = config::DO_CLICK, action = ArgAction::Set)]
    do_click: bool,

    /// Click by gripping (true) or by dwelling (false)
    #[arg(long, default_value_t = config::USE_GRIP_GESTURE, action = ArgAction::Set)]
    use_grip_gesture: bool,

    /// Cursor smoothing, 0 to 0.95
    #[arg(long, default_value_t = config::CURSOR_SMOOTHING)]
    cursor_smoothing: f32,

    /// Milliseconds between frames from the scripted or replay source
    #[arg(long, default_value_t = 33)]
    frame_interval_ms: u64,

    /// Dwell timer period in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_interval_ms: u64,

    /// Seconds between status log lines
    #[arg(long, default_value_t = 60)]
    status_interval_secs: u64,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("kinect-mouse {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinect_mouse=info".into()),
        )
        .init();

    info!("kinect-mouse v{} starting", env!("CARGO_PKG_VERSION"));

    let screen = match cli.screen.as_deref() {
        Some(s) => match Config::parse_screen(s) {
            Some(size) => Some(size),
            None => {
                eprintln!("Invalid screen size: {s}. Use WxH, e.g. 1920x1080");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let config = Config {
        mouse_sensitivity: cli.mouse_sensitivity,
        time_required: cli.time_required,
        pause_threshold: cli.pause_threshold,
        do_click: cli.do_click,
        use_grip_gesture: cli.use_grip_gesture,
        cursor_smoothing: cli.cursor_smoothing,
        screen,
        tick_interval: Duration::from_millis(cli.tick_interval_ms),
        status_interval: Duration::from_secs(cli.status_interval_secs),
    }
    .sanitized();
    info!(config = %config.config_sexp(), "configuration");

    let frame_interval = Duration::from_millis(cli.frame_interval_ms);
    let mut source: Box<dyn FrameSource> = match cli.source.as_str() {
        "scripted" => Box::new(ScriptedSource::new(frame_interval)),
        "replay" => match cli.replay_file {
            Some(path) => Box::new(ReplaySource::new(path, frame_interval)),
            None => {
                eprintln!("--source replay needs --replay-file PATH");
                std::process::exit(1);
            }
        },
        other => {
            eprintln!("Unknown source: {other}. Use: scripted or replay");
            std::process::exit(1);
        }
    };

    let pointer: Box<dyn PointerSink> = match cli.pointer.as_str() {
        "virtual" => {
            let size = config.screen.map(ScreenSize::from).unwrap_or_default();
            Box::new(RecordingPointer::new(size).without_history())
        }
        "system" => system_pointer(config.screen)?,
        other => {
            eprintln!("Unknown pointer: {other}. Use: virtual or system");
            std::process::exit(1);
        }
    };

    let state = ControllerState::new(config, pointer)?;
    let mut backend = Backend::new(
        state,
        BackendConfig {
            exit_after: cli.exit_after.map(Duration::from_secs),
            ..BackendConfig::default()
        },
    )?;

    let stats = backend.run(source.as_mut())?;
    info!("Session finished: {}", stats.stats_sexp());
    Ok(())
}

#[cfg(feature = "system-pointer")]
fn system_pointer(screen: Option<(i32, i32)>) -> anyhow::Result<Box<dyn PointerSink>> {
    let pointer = kinect_mouse::pointer::SystemPointer::new(screen.map(ScreenSize::from))?;
    Ok(Box::new(pointer))
}

#[cfg(not(feature = "system-pointer"))]
fn system_pointer(_screen: Option<(i32, i32)>) -> anyhow::Result<Box<dyn PointerSink>> {
    anyhow::bail!("system pointer unavailable (compiled without 'system-pointer' feature)")
}
