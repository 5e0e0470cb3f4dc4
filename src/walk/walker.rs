use crate::buffer::RecordBuffer;
use crate::config::{MAX_PATH_LEN, WalkConfig};
use crate::metadata::Metadata;
use crate::pool::{WorkerClaim, WorkerPool};
use crate::record::ENTRY_FCOUNT;
use crate::sink::OutputSink;
use std::os::unix::ffi::OsStrExt as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Filtered at every level when the snapshot option is on.
const SNAPSHOT_NAME: &[u8] = b".snapshot";

/// Everything a worker touches, bundled so concurrent walks never share
/// state through module globals.
pub(crate) struct WalkContext {
    pub(crate) pool: WorkerPool,
    pub(crate) sink: OutputSink,
    pub(crate) config: WalkConfig,
}

/// One directory to expand: the path, the snapshot of the directory
/// itself, and where it sits in the tree.
pub(crate) struct DirTask {
    pub(crate) path: PathBuf,
    pub(crate) parent_inode: u64,
    pub(crate) depth: i64,
    pub(crate) meta: Metadata,
}

/// Launches a detached worker on a claimed seat. The claim was taken (and
/// the active count bumped) before this is called, so the pool can never
/// observe idle between the decision to spawn and the thread starting.
pub(crate) fn spawn_worker(ctx: Arc<WalkContext>, task: DirTask, claim: WorkerClaim) {
    let WorkerClaim { worker_id, buffer } = claim;
    thread::Builder::new()
        .name(format!("fsweep-worker-{worker_id}"))
        .spawn(move || {
            let mut buffer = buffer;
            traverse(&ctx, &task, &mut buffer);
            // flush before release: once active hits zero every record is
            // already inside the sink
            ctx.sink.flush(&mut buffer);
            ctx.pool.release(buffer);
        })
        .expect("failed to spawn walk worker");
}

/**
Expands one directory: records every child whose lstat succeeds, fans out
subdirectories (new worker if the pool has capacity, inline recursion into
this worker's buffer otherwise), then appends the directory's own summary
record carrying the aggregates over its direct children.

Infallible by design; anything that goes wrong with an individual entry
just leaves it out of the output.
*/
pub(crate) fn traverse(ctx: &Arc<WalkContext>, task: &DirTask, buf: &mut RecordBuffer) {
    let Ok(entries) = std::fs::read_dir(&task.path) else {
        // unreadable directory: a single entry-style record in place of a
        // summary, aggregates unknown
        buf.append_record(
            &ctx.sink,
            task.path.as_os_str().as_bytes(),
            &task.meta,
            task.parent_inode,
            task.depth,
            ENTRY_FCOUNT,
            0,
        );
        return;
    };

    let mut local_count: i64 = 0;
    let mut local_bytes: u64 = 0;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if ctx.config.ignore_snapshots && name.as_bytes() == SNAPSHOT_NAME {
            continue;
        }

        let child = task.path.join(&name);
        if child.as_os_str().len() > MAX_PATH_LEN {
            continue;
        }
        // the entry may vanish between readdir and here; skip uncounted
        let Ok(meta) = Metadata::lstat(&child) else {
            continue;
        };
        local_count += 1;

        if meta.is_dir() {
            let child_task = DirTask {
                path: child,
                parent_inode: task.meta.ino,
                depth: task.depth + 1,
                meta,
            };
            match ctx.pool.try_claim() {
                Some(claim) => spawn_worker(Arc::clone(ctx), child_task, claim),
                // pool saturated: nested call sharing this worker's buffer
                None => traverse(ctx, &child_task, buf),
            }
        } else {
            // symlinks, devices, sockets and fifos are recorded like files
            // and never followed
            local_bytes += meta.size;
            buf.append_record(
                &ctx.sink,
                child.as_os_str().as_bytes(),
                &meta,
                task.meta.ino,
                task.depth + 1,
                ENTRY_FCOUNT,
                0,
            );
        }
    }

    buf.append_record(
        &ctx.sink,
        task.path.as_os_str().as_bytes(),
        &task.meta,
        task.parent_inode,
        task.depth,
        local_count,
        local_bytes,
    );
}
