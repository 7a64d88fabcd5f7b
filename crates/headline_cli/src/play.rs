//! Headless playback
//!
//! Mounts one element in a [`HeadlessHost`], steps it at a fixed frame
//! rate and prints the heading whenever its visible text changes.

use anyhow::{bail, Context, Result};
use headline_core::{Attributes, Viewport};
use headline_element::{HeadingSnapshot, HeadlessHost};
use serde::Serialize;
use tracing::info;

/// A viewport change at a point in simulated time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resize {
    pub at_secs: f32,
    pub width: u32,
    pub height: u32,
}

impl Resize {
    /// Parse `SECONDS:WIDTHxHEIGHT`
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        let (at, size) = value
            .split_once(':')
            .ok_or_else(|| format!("expected SECONDS:WIDTHxHEIGHT, got '{}'", value))?;
        let (width, height) = size
            .split_once('x')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size))?;
        Ok(Self {
            at_secs: at.parse().map_err(|_| format!("invalid time '{}'", at))?,
            width: width.parse().map_err(|_| format!("invalid width '{}'", width))?,
            height: height
                .parse()
                .map_err(|_| format!("invalid height '{}'", height))?,
        })
    }
}

#[derive(Debug)]
pub struct PlayOptions {
    pub width: u32,
    pub height: u32,
    pub seconds: f32,
    pub fps: u32,
    pub resize: Option<Resize>,
    pub json: bool,
}

#[derive(Serialize)]
struct Sample<'a> {
    time_ms: f32,
    phase: String,
    #[serde(flatten)]
    snapshot: &'a HeadingSnapshot,
}

pub fn run(attributes: Attributes, options: &PlayOptions) -> Result<()> {
    if options.fps == 0 {
        bail!("--fps must be at least 1");
    }
    if options.seconds.is_nan() || options.seconds <= 0.0 {
        bail!("--seconds must be positive");
    }

    let viewport = Viewport::new(options.width as f32, options.height as f32);
    let mut host = HeadlessHost::new(viewport);
    let id = host.create_element(attributes);
    host.connect(id)?;
    info!("playing {:.1}s at {} fps", options.seconds, options.fps);

    let dt_ms = 1000.0 / options.fps as f32;
    let frame_count = (options.seconds * options.fps as f32).ceil() as u32;
    let mut pending_resize = options.resize;
    let mut last_line: Option<String> = None;

    for frame in 1..=frame_count {
        let time_ms = frame as f32 * dt_ms;
        if let Some(resize) = pending_resize {
            if time_ms >= resize.at_secs * 1000.0 {
                info!("resizing to {}x{}", resize.width, resize.height);
                host.resize(resize.width, resize.height);
                pending_resize = None;
            }
        }

        host.frame(dt_ms);

        let element = host.element(id).context("Element was removed")?;
        let snapshot = element.tree().snapshot();
        let line = snapshot.to_string();
        if last_line.as_deref() == Some(line.as_str()) {
            continue;
        }

        if options.json {
            let sample = Sample {
                time_ms,
                phase: format!("{:?}", element.phase()),
                snapshot: &snapshot,
            };
            println!("{}", serde_json::to_string(&sample)?);
        } else {
            println!("{:>8.0}ms  {}", time_ms, line);
        }
        last_line = Some(line);
    }

    host.disconnect(id)?;
    Ok(())
}
