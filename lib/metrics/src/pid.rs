//! Resolving the node's process id from its PID file.

use crate::error::{CollectionError, PidFileError};
use crate::fs::FileSystem;
use core::fmt;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::path::Path;
use tracing::{instrument, trace};

/// Operating-system process identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Shrinkwrap,
)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Pid {
    /// The id widened to the signed form carried by lookup errors.
    pub fn as_raw(self) -> i64 {
        i64::from(self.0)
    }
}

/// Read a file that must hold exactly one non-blank line, and return that
/// line without its terminator. A single trailing newline is accepted.
pub async fn read_single_line(fs: &dyn FileSystem, path: &Path) -> Result<String, PidFileError> {
    let contents = fs.read_to_string(path).await?;
    let lines: Vec<&str> = contents.lines().collect();

    match lines.as_slice() {
        [] => Err(PidFileError::Empty),
        [line] if line.trim().is_empty() => Err(PidFileError::Blank),
        [line] => Ok(line.to_string()),
        _ => Err(PidFileError::LineCount(lines.len())),
    }
}

/// Read and parse the PID file at `path`. The line is parsed as-is, so
/// surrounding whitespace makes it unparseable.
///
/// A well-formed integer that no process can carry (negative, or wider
/// than a pid) is a failed lookup rather than a parse error.
#[instrument(level = "debug", skip(fs))]
pub async fn read_pid(fs: &dyn FileSystem, path: &Path) -> Result<Pid, CollectionError> {
    let line = read_single_line(fs, path)
        .await
        .map_err(|source| CollectionError::PidFile {
            path: path.to_path_buf(),
            source,
        })?;

    let raw = line
        .parse::<i64>()
        .map_err(|source| CollectionError::PidParse {
            path: path.to_path_buf(),
            content: line.clone(),
            source,
        })?;

    let pid = u32::try_from(raw)
        .map(Pid)
        .map_err(|_| CollectionError::ProcessNotFound(raw))?;

    trace!(%pid, "Resolved process id from PID file");
    Ok(pid)
}
