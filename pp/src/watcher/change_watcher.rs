//! Base directory watcher implementation

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::WatcherConfig;
use crate::catalog::ScanConfig;

/// Raw notifications buffered ahead of the debouncer
///
/// When full, new notifications are dropped: a signal is already pending and
/// the re-scan it triggers observes their effect.
const RAW_EVENT_CAPACITY: usize = 1024;

/// Errors starting a watcher
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Cannot watch {path}: not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Filesystem watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// One debounced batch of filesystem activity under the base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryChanged {
    /// Number of raw notifications coalesced into this signal
    pub events: usize,
    /// Distinct paths the notifications mentioned
    pub paths: BTreeSet<PathBuf>,
    /// When the last coalesced notification arrived
    pub last_event: Instant,
}

/// A raw notification as forwarded from the notify callback thread
#[derive(Debug)]
struct RawChange {
    at: Instant,
    paths: Vec<PathBuf>,
}

/// Lazy, infinite sequence of debounced change signals
///
/// Dropping the stream stops the OS watcher and the debounce task. A stream
/// cannot be restarted; start a new watcher instead.
pub struct ChangeStream {
    rx: mpsc::Receiver<DirectoryChanged>,
    _watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl ChangeStream {
    /// Wait for the next signal; `None` once the underlying watcher is gone
    pub async fn next(&mut self) -> Option<DirectoryChanged> {
        self.rx.recv().await
    }
}

impl Drop for ChangeStream {
    fn drop(&mut self) {
        debug!("ChangeStream::drop: stopping debounce task");
        self.task.abort();
    }
}

/// Starts filesystem watchers for a base directory
pub struct ChangeWatcher;

impl ChangeWatcher {
    /// Watch `base` recursively
    ///
    /// Access-only events and events under hidden or excluded directories (per
    /// `scan`) are dropped before debouncing. Must be called from within a
    /// tokio runtime.
    pub fn start(base: &Path, config: &WatcherConfig, scan: &ScanConfig) -> Result<ChangeStream, WatchError> {
        Self::start_ignoring(base, config, scan, Vec::new())
    }

    /// Like [`Self::start`], but notifications touching only `ignored` paths are dropped
    ///
    /// Used for files the caller itself writes inside `base`, such as the
    /// output of `pp watch`. Ignored paths must be absolute and canonical.
    pub fn start_ignoring(
        base: &Path,
        config: &WatcherConfig,
        scan: &ScanConfig,
        ignored: Vec<PathBuf>,
    ) -> Result<ChangeStream, WatchError> {
        debug!(?base, debounce_ms = config.debounce_ms, ?ignored, "ChangeWatcher::start_ignoring: called");
        if !base.is_dir() {
            return Err(WatchError::NotADirectory {
                path: base.to_path_buf(),
            });
        }

        let (raw_tx, raw_rx) = mpsc::channel(RAW_EVENT_CAPACITY);
        let filter_base = base.to_path_buf();
        let filter = scan.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(change) = relevant_change(&filter_base, &filter, &ignored, event) {
                    match raw_tx.try_send(change) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => debug!("ChangeWatcher: raw buffer full, dropping notification"),
                        // Receiver gone means the stream was dropped
                        Err(TrySendError::Closed(_)) => {}
                    }
                }
            }
            Err(e) => warn!(error = %e, "Filesystem watcher reported an error"),
        })?;
        watcher.watch(base, RecursiveMode::Recursive)?;

        let mut stream = Self::from_raw(raw_rx, config);
        stream._watcher = Some(watcher);
        info!(base = %base.display(), debounce_ms = config.debounce_ms, "ChangeWatcher started");
        Ok(stream)
    }

    /// Build a stream over an already-filtered raw channel
    fn from_raw(raw_rx: mpsc::Receiver<RawChange>, config: &WatcherConfig) -> ChangeStream {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let task = tokio::spawn(debounce(raw_rx, tx, config.debounce()));
        ChangeStream {
            rx,
            _watcher: None,
            task,
        }
    }
}

/// Keep events that could change the catalog
fn relevant_change(base: &Path, scan: &ScanConfig, ignored: &[PathBuf], event: Event) -> Option<RawChange> {
    if matches!(event.kind, EventKind::Access(_)) {
        return None;
    }
    let paths: Vec<PathBuf> = event
        .paths
        .into_iter()
        .filter(|p| !ignored.contains(p))
        .filter(|p| match p.strip_prefix(base) {
            Ok(rel) => {
                let rel = rel.to_string_lossy().replace('\\', "/");
                !scan.skips_relative(&rel)
            }
            Err(_) => false,
        })
        .collect();
    if paths.is_empty() {
        None
    } else {
        Some(RawChange {
            at: Instant::now(),
            paths,
        })
    }
}

/// Collapse raw changes into one signal per window
///
/// The first change opens a window; changes arriving before it closes join
/// the batch. So at most one signal is emitted per window, and a burst of
/// writes costs a single re-scan.
async fn debounce(
    mut raw: mpsc::Receiver<RawChange>,
    out: mpsc::Sender<DirectoryChanged>,
    window: std::time::Duration,
) {
    debug!(?window, "debounce: started");
    while let Some(first) = raw.recv().await {
        let mut batch = DirectoryChanged {
            events: 1,
            paths: first.paths.into_iter().collect(),
            last_event: first.at,
        };
        let deadline = tokio::time::Instant::now() + window;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                next = raw.recv() => match next {
                    Some(change) => {
                        batch.events += 1;
                        batch.paths.extend(change.paths);
                        batch.last_event = change.at;
                    }
                    None => break,
                },
            }
        }

        debug!(events = batch.events, paths = batch.paths.len(), "debounce: emitting signal");
        if out.send(batch).await.is_err() {
            debug!("debounce: consumer dropped, stopping");
            return;
        }
    }
    debug!("debounce: raw channel closed, stopping");
}
