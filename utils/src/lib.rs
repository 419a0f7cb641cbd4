//! IO helpers for kitbag.
//!
//! Kept apart from the pure `kitbag-types` crate because everything here
//! touches the filesystem or the async runtime:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`fs`**: Directory listing, JSON file loading, string saving
//! - **`retry`**: Bounded retry of async operations with a fixed delay

pub mod atomic_write;
pub mod fs;
pub mod retry;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, PersistMode, atomic_write,
    atomic_write_with_options, backup_path, recover_bak_file,
};
pub use fs::{ReadJsonError, all_contents, list_dir, read_json, save_string};
pub use retry::{RetryPolicy, retrying, spawn_retrying};
