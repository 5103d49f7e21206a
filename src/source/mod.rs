//! Concrete log container sources.
//!
//! The container format is resolved exactly once at startup by sniffing the
//! file's magic bytes, then dispatching to a format-specific source. There is
//! no ambient "is reader X available" branching; an unrecognized container is
//! a fatal open error.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::record::RecordSource;

pub mod db3;
pub mod mcap;

pub use self::db3::Db3Source;
pub use self::mcap::McapSource;

const MCAP_MAGIC: &[u8] = b"\x89MCAP0\r\n";
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Recording container variant, resolved once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// `.mcap` recording.
    Mcap,
    /// rosbag2 SQLite storage (`.db3`).
    Ros2Db3,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Mcap => write!(f, "mcap"),
            LogFormat::Ros2Db3 => write!(f, "rosbag2 sqlite"),
        }
    }
}

impl LogFormat {
    /// Sniff the container format from magic bytes. `path` may be a bag
    /// directory; it is resolved to the contained storage file first.
    pub fn detect(path: &Path) -> Result<(LogFormat, PathBuf)> {
        let file_path = resolve_storage_file(path)?;
        let mut header = [0u8; 16];
        let mut file = File::open(&file_path)
            .with_context(|| format!("open log container {}", file_path.display()))?;
        let read = file
            .read(&mut header)
            .with_context(|| format!("read header of {}", file_path.display()))?;

        if read >= MCAP_MAGIC.len() && header.starts_with(MCAP_MAGIC) {
            return Ok((LogFormat::Mcap, file_path));
        }
        if read >= SQLITE_MAGIC.len() && header.starts_with(SQLITE_MAGIC) {
            return Ok((LogFormat::Ros2Db3, file_path));
        }
        Err(anyhow!(
            "unrecognized log container {} (expected mcap or rosbag2 sqlite)",
            file_path.display()
        ))
    }
}

/// Open a record source for the container at `path`.
pub fn open(path: &Path) -> Result<(LogFormat, Box<dyn RecordSource>)> {
    let (format, file_path) = LogFormat::detect(path)?;
    let source: Box<dyn RecordSource> = match format {
        LogFormat::Mcap => Box::new(McapSource::open(&file_path)?),
        LogFormat::Ros2Db3 => Box::new(Db3Source::open(&file_path)?),
    };
    Ok((format, source))
}

/// rosbag2 bags are directories with the storage file inside; accept either
/// the directory or the file itself.
fn resolve_storage_file(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("list bag directory {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("db3") | Some("mcap")
            )
        })
        .collect();
    candidates.sort();
    match candidates.len() {
        0 => Err(anyhow!(
            "no .db3 or .mcap storage file in {}",
            path.display()
        )),
        1 => Ok(candidates.remove(0)),
        _ => {
            log::warn!(
                "{} storage files in {}; using {}",
                candidates.len(),
                path.display(),
                candidates[0].display()
            );
            Ok(candidates.remove(0))
        }
    }
}
