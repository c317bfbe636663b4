use crate::pid::Pid;
use crate::snapshot::MetricField;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a PID file could not yield a single line.
#[derive(Error, Debug)]
pub enum PidFileError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty, expected 1 line")]
    Empty,

    #[error("file contains {0} lines, expected 1 line")]
    LineCount(usize),

    #[error("file holds a single blank line")]
    Blank,
}

/// A failed sub-measurement. Collection records one of these per failing
/// field and carries on with the rest.
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("PID file `{path}` is unusable: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: PidFileError,
    },

    #[error("PID file `{path}` holds `{content}`, which is not a base-10 process id")]
    PidParse {
        path: PathBuf,
        content: String,
        #[source]
        source: ParseIntError,
    },

    /// Holds the id as read, which may lie outside the range of valid pids.
    #[error("no running process with id {0}")]
    ProcessNotFound(i64),

    #[error("failed to sample CPU usage of process {pid}: {reason}")]
    Sampling { pid: Pid, reason: String },

    #[error("failed to query host memory: {0}")]
    MemoryQuery(String),

    #[error("failed to query free space for `{path}`: {reason}")]
    DiskQuery { path: PathBuf, reason: String },
}

impl CollectionError {
    /// The snapshot field this error left unpopulated.
    pub fn field(&self) -> MetricField {
        match self {
            CollectionError::PidFile { .. }
            | CollectionError::PidParse { .. }
            | CollectionError::ProcessNotFound(_)
            | CollectionError::Sampling { .. } => MetricField::Cpu,
            CollectionError::MemoryQuery(_) => MetricField::Memory,
            CollectionError::DiskQuery { .. } => MetricField::Disk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_their_field() {
        let pid_file = CollectionError::PidFile {
            path: PathBuf::from("/run/pid"),
            source: PidFileError::Empty,
        };
        assert_eq!(pid_file.field(), MetricField::Cpu);
        assert_eq!(CollectionError::ProcessNotFound(7).field(), MetricField::Cpu);
        assert_eq!(
            CollectionError::MemoryQuery("unavailable".into()).field(),
            MetricField::Memory
        );
        assert_eq!(
            CollectionError::DiskQuery {
                path: PathBuf::from("/data"),
                reason: "ENOENT".into()
            }
            .field(),
            MetricField::Disk
        );
    }

    #[test]
    fn messages_name_the_cause() {
        let err = CollectionError::PidFile {
            path: PathBuf::from("/run/pid"),
            source: PidFileError::LineCount(3),
        };
        assert_eq!(
            err.to_string(),
            "PID file `/run/pid` is unusable: file contains 3 lines, expected 1 line"
        );

        let err = CollectionError::ProcessNotFound(4242);
        assert_eq!(err.to_string(), "no running process with id 4242");

        let err = CollectionError::ProcessNotFound(-1);
        assert_eq!(err.to_string(), "no running process with id -1");
    }
}
