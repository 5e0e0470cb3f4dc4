/*!
A fast, multi-threaded filesystem census tool.

`fsweep` walks a subtree with a bounded pool of detached worker threads and
streams one CSV record per directory entry into a file, plus one aggregate
record per directory (direct-child count and regular-file byte sum). The
record stream can be wrapped in a single streaming zstd frame; the header
line always stays plain text so the first line of the file is probeable.
*/

mod buffer;
mod config;
mod error;
mod filetype;
mod metadata;
mod pool;
mod record;
mod sink;
mod walk;

pub use config::{DEFAULT_WORKERS, MAX_WORKERS, WalkConfig};
pub use error::{Result, WalkError};
pub use filetype::FileType;
pub use metadata::Metadata;
pub use record::HEADER;
pub use walk::{WalkBuilder, WalkSummary, Walker};

//this allocator is more efficient than jemalloc through my testing
#[cfg(all(
    feature = "mimalloc",
    any(target_os = "linux", target_os = "macos", target_os = "android")
))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
