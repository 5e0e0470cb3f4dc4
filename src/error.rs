use std::io;
use std::path::PathBuf;

/// Generic result type for walk operations
pub type Result<T> = core::result::Result<T, WalkError>;

#[derive(Debug)]
/// Errors surfaced by the walk entry point.
///
/// Failures inside the traversal itself (unreadable directories, entries
/// that vanish between readdir and lstat) are local and never reported
/// here; they only shrink the output.
pub enum WalkError {
    /// The output file could not be created.
    SinkCreate(PathBuf, io::Error),
    /// The zstd stream could not be initialised.
    Compressor(io::Error),
    /// The root path could not be lstat'd.
    RootStat(PathBuf, io::Error),
    /// A write to the underlying sink failed. Only the first such error is
    /// kept; it is surfaced after the walk has finished.
    SinkWrite(io::Error),
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SinkCreate(path, err) => {
                write!(f, "cannot create output file {}: {err}", path.display())
            }
            Self::Compressor(err) => write!(f, "cannot initialise zstd stream: {err}"),
            Self::RootStat(path, err) => {
                write!(f, "cannot stat root path {}: {err}", path.display())
            }
            Self::SinkWrite(err) => write!(f, "output write failed: {err}"),
        }
    }
}

impl std::error::Error for WalkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SinkCreate(_, err)
            | Self::Compressor(err)
            | Self::RootStat(_, err)
            | Self::SinkWrite(err) => Some(err),
        }
    }
}
