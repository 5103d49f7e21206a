//! Frame persistence.
//!
//! The sink receives a decoded frame plus the full output path chosen by the
//! pipeline and is responsible for re-encoding the canonical pixel buffer
//! into an image file. Frames arrive in RGB/mono order; no channel
//! reordering happens here.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::decode::DecodedFrame;

/// Persists decoded frames. Failures are reported to the pipeline, which
/// counts the record as non-succeeded and continues.
pub trait FrameSink {
    fn write(&mut self, frame: &DecodedFrame, path: &Path) -> Result<()>;
}

/// JPEG sink backed by the `image` crate. Creates per-topic directories on
/// demand.
pub struct JpegSink;

impl FrameSink for JpegSink {
    fn write(&mut self, frame: &DecodedFrame, path: &Path) -> Result<()> {
        let color = match frame.channels {
            1 => image::ExtendedColorType::L8,
            3 => image::ExtendedColorType::Rgb8,
            other => return Err(anyhow!("unexpected channel count {}", other)),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output directory {}", parent.display()))?;
        }
        image::save_buffer(path, &frame.pixels, frame.width, frame.height, color)
            .with_context(|| format!("encode frame to {}", path.display()))?;
        Ok(())
    }
}

/// Directory name for a topic: path separators become underscores, colons
/// are stripped, leading/trailing underscores trimmed.
pub fn topic_dir_name(topic: &str) -> String {
    topic
        .replace('/', "_")
        .replace(':', "")
        .trim_matches('_')
        .to_string()
}
