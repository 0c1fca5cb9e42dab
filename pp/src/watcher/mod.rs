//! Watcher module for base directory monitoring
//!
//! The ChangeWatcher turns raw filesystem notifications into a debounced
//! stream of "directory changed" signals. The session consumes the stream and
//! re-scans the catalog once per signal.

mod change_watcher;
mod config;

pub use change_watcher::{ChangeStream, ChangeWatcher, DirectoryChanged, WatchError};
pub use config::WatcherConfig;
