use crate::config::{DEFAULT_WORKERS, WalkConfig};
use crate::error::{Result, WalkError};
use crate::metadata::Metadata;
use crate::pool::WorkerPool;
use crate::sink::OutputSink;
use crate::walk::walker::{DirTask, WalkContext, spawn_worker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Safety net against a wedged worker. The wait itself is condvar-driven;
/// this only bounds it.
const WALK_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
/// What a finished walk reports back to the caller.
pub struct WalkSummary {
    /// Where the record stream landed.
    pub output: PathBuf,
    /// Whether the record lines were zstd-framed.
    pub compressed: bool,
    /// Total workers launched over the walk's lifetime (monotonic, not the
    /// peak concurrency).
    pub workers_spawned: u64,
}

/**
Entry point for one filesystem walk.

```no_run
use fsweep::Walker;

let summary = Walker::init("/srv/data", "/tmp/census.csv")
    .max_workers(16)
    .compress(true)
    .run()
    .expect("walk failed");
println!("wrote {}", summary.output.display());
```
*/
#[derive(Debug)]
pub struct Walker;

impl Walker {
    /// Starts configuring a walk of `root` writing records to `output`.
    #[must_use]
    pub fn init<R: AsRef<Path>, O: AsRef<Path>>(root: R, output: O) -> WalkBuilder {
        WalkBuilder::new(root, output)
    }
}

#[derive(Debug)]
/// Builder for a walk; the defaults match the interface contract
/// (8 workers, snapshots ignored, no compression).
pub struct WalkBuilder {
    root: PathBuf,
    output: PathBuf,
    max_workers: usize,
    ignore_snapshots: bool,
    compress: bool,
}

impl WalkBuilder {
    #[must_use]
    pub fn new<R: AsRef<Path>, O: AsRef<Path>>(root: R, output: O) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            max_workers: DEFAULT_WORKERS,
            ignore_snapshots: true,
            compress: false,
        }
    }

    /// Worker cap; clamped to `1..=32` at run time.
    #[must_use]
    pub fn max_workers(mut self, count: usize) -> Self {
        self.max_workers = count;
        self
    }

    /// Whether entries named `.snapshot` are skipped at every level.
    #[must_use]
    pub fn ignore_snapshots(mut self, ignore: bool) -> Self {
        self.ignore_snapshots = ignore;
        self
    }

    /// Whether the record lines are streamed through a zstd frame. The
    /// header line stays raw either way.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /**
    Runs the walk to completion.

    Opens the sink, stats the root, writes the header, seeds the pool with
    the root worker, then blocks until the active-worker count drops to
    zero (with a one-hour safety timeout that warns and finalizes anyway).

    # Errors
    - [`WalkError::SinkCreate`] / [`WalkError::Compressor`]: nothing was walked.
    - [`WalkError::RootStat`]: the sink file exists but holds no records.
    - [`WalkError::SinkWrite`]: the walk ran; the first write failure is
      reported after finalization.
    */
    pub fn run(self) -> Result<WalkSummary> {
        let config = WalkConfig::new(self.max_workers, self.ignore_snapshots, self.compress);

        let sink = OutputSink::create(&self.output, config.compress)?;
        let root_meta = Metadata::lstat(&self.root)
            .map_err(|err| WalkError::RootStat(self.root.clone(), err))?;
        sink.write_header()?;

        let ctx = Arc::new(WalkContext {
            pool: WorkerPool::new(config.max_workers),
            sink,
            config,
        });

        let claim = ctx
            .pool
            .try_claim()
            .expect("a fresh pool always has a free seat");
        let root_task = DirTask {
            path: self.root,
            parent_inode: 0,
            depth: -1,
            meta: root_meta,
        };
        spawn_worker(Arc::clone(&ctx), root_task, claim);

        if !ctx.pool.wait_idle(WALK_TIMEOUT) {
            eprintln!(
                "fsweep: warning: timed out waiting for walk workers (active={})",
                ctx.pool.active()
            );
        }

        ctx.sink.finalize()?;
        Ok(WalkSummary {
            output: self.output,
            compressed: config.compress,
            workers_spawned: ctx.pool.total_workers(),
        })
    }
}
