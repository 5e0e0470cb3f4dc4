use crate::buffer::RecordBuffer;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Wait granularity while blocked on the idle condvar.
const IDLE_WAIT: Duration = Duration::from_millis(100);

struct PoolState {
    /// Number of claims currently out, i.e. workers between claim and
    /// release. Zero exactly when all staged output has reached the sink.
    active: usize,
    /// Monotonic worker id source; never decremented.
    total_workers: u64,
    /// Buffers not currently owned by a worker. Allocated once at init and
    /// recycled; length + `active` always equals the pool capacity.
    free: Vec<RecordBuffer>,
}

/// A claimed seat in the pool: the worker id and the staging buffer the
/// worker owns until it releases. Dropping the buffer back is done through
/// [`WorkerPool::release`], never implicitly.
pub struct WorkerClaim {
    pub worker_id: u64,
    pub buffer: RecordBuffer,
}

/**
Fixed-capacity worker pool.

A claim atomically takes a free buffer and bumps the active count under one
lock, before any thread is spawned on it; release returns the buffer and
decrements, signalling the idle condvar when the count reaches zero. Because
a worker flushes its buffer before releasing, "active == 0" implies every
record has been handed to the sink.
*/
pub struct WorkerPool {
    state: Mutex<PoolState>,
    idle: Condvar,
    capacity: usize,
}

impl WorkerPool {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                active: 0,
                total_workers: 0,
                free: (0..capacity).map(|_| RecordBuffer::new()).collect(),
            }),
            idle: Condvar::new(),
            capacity,
        }
    }

    /// Claims a seat if the pool has capacity, or returns `None` so the
    /// caller recurses inline instead. Saturation is not an error.
    #[must_use]
    pub fn try_claim(&self) -> Option<WorkerClaim> {
        let mut state = self.lock();
        if state.active >= self.capacity {
            return None;
        }
        let buffer = state.free.pop()?;
        let worker_id = state.total_workers;
        state.total_workers += 1;
        state.active += 1;
        Some(WorkerClaim { worker_id, buffer })
    }

    /// Returns a worker's buffer to the free-list. The buffer must already
    /// have been flushed; the zero-crossing of the active count is what the
    /// entry point's wait observes.
    pub fn release(&self, buffer: RecordBuffer) {
        let mut state = self.lock();
        debug_assert!(buffer.is_empty(), "released buffer still holds records");
        state.free.push(buffer);
        state.active -= 1;
        if state.active == 0 {
            self.idle.notify_all();
        }
    }

    /// Blocks until the active count reaches zero or `timeout` elapses.
    /// Returns whether the pool actually went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.active > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = (deadline - now).min(IDLE_WAIT);
            let (guard, _timed_out) = self
                .idle
                .wait_timeout(state, wait)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        true
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.lock().active
    }

    #[must_use]
    pub fn total_workers(&self) -> u64 {
        self.lock().total_workers
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
