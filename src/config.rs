/// Hard ceiling on simultaneously running workers, matching the size of the
/// buffer pool. The runtime cap is clamped to this.
pub const MAX_WORKERS: usize = 32;

/// Default runtime worker cap when the caller does not supply one.
pub const DEFAULT_WORKERS: usize = 8;

/// Longest composed path we will lstat. Entries whose full path would
/// exceed this are skipped outright rather than truncated.
pub const MAX_PATH_LEN: usize = libc::PATH_MAX as usize;

/// Capacity of each worker's staging buffer. With paths bounded by
/// [`MAX_PATH_LEN`] a single record can never approach this.
pub const BUFFER_SIZE: usize = 512 * 1024;

const _: () = assert!(
    MAX_PATH_LEN * 2 < BUFFER_SIZE,
    "a single record must always fit the staging buffer"
);

#[derive(Clone, Copy, Debug)]
/// Read-only options for one walk, fixed before the first worker starts.
pub struct WalkConfig {
    /// Worker cap, already clamped to `1..=MAX_WORKERS`.
    pub max_workers: usize,
    /// Skip entries named `.snapshot` at every level.
    pub ignore_snapshots: bool,
    /// Stream the record lines through a zstd frame.
    pub compress: bool,
}

impl WalkConfig {
    #[must_use]
    pub const fn new(max_workers: usize, ignore_snapshots: bool, compress: bool) -> Self {
        // clamp() is not const-stable on usize in our MSRV range
        let capped = if max_workers < 1 {
            1
        } else if max_workers > MAX_WORKERS {
            MAX_WORKERS
        } else {
            max_workers
        };
        Self {
            max_workers: capped,
            ignore_snapshots,
            compress,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, true, false)
    }
}
