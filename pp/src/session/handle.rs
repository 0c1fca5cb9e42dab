//! SessionHandle - shared access to the active session

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Session;
use crate::catalog::CatalogError;
use crate::watcher::{ChangeStream, DirectoryChanged};

/// Default capacity of the session event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Something the reconcile pipeline did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The catalog was replaced and the selection pruned
    Rescanned { entries: usize, pruned: Vec<String> },
    /// A re-scan failed; the previous catalog is still in place
    ScanFailed { error: String },
    /// A change signal was already covered by a newer scan
    Superseded,
}

/// Cloneable handle serializing all access to one session
///
/// Scan, reconcile and compose all happen while holding the mutex, so the
/// reconcile loop and user commands never see a catalog mid-replacement.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        debug!(base = ?session.base(), "SessionHandle::new: called");
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(session)),
            events,
        }
    }

    /// Exclusive access to the session
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().await
    }

    /// Receive events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// User-initiated re-scan
    pub async fn rescan(&self) -> Result<Vec<String>, CatalogError> {
        debug!("SessionHandle::rescan: called");
        let mut session = self.lock().await;
        let result = session.rescan();
        let event = match &result {
            Ok(pruned) => SessionEvent::Rescanned {
                entries: session.catalog().len(),
                pruned: pruned.clone(),
            },
            Err(e) => SessionEvent::ScanFailed { error: e.to_string() },
        };
        drop(session);
        self.emit(event);
        result
    }

    /// Handle one watcher signal: re-scan and reconcile unless a newer scan covered it
    pub async fn apply(&self, signal: &DirectoryChanged) -> SessionEvent {
        debug!(events = signal.events, "SessionHandle::apply: called");
        let mut session = self.lock().await;

        let event = if signal.last_event <= session.last_scan() {
            debug!("SessionHandle::apply: signal predates last scan, skipping");
            SessionEvent::Superseded
        } else {
            match session.rescan() {
                Ok(pruned) => {
                    info!(
                        entries = session.catalog().len(),
                        pruned = pruned.len(),
                        "Reconciled after directory change"
                    );
                    SessionEvent::Rescanned {
                        entries: session.catalog().len(),
                        pruned,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Re-scan after directory change failed");
                    SessionEvent::ScanFailed { error: e.to_string() }
                }
            }
        };
        drop(session);

        self.emit(event.clone());
        event
    }

    /// Consume a change stream until it ends
    pub async fn run_reconcile(self, mut stream: ChangeStream) {
        info!("Reconcile loop started");
        while let Some(signal) = stream.next().await {
            self.apply(&signal).await;
        }
        info!("Reconcile loop stopped: watcher closed");
    }

    /// Spawn [`Self::run_reconcile`] on the runtime
    pub fn spawn_reconcile(&self, stream: ChangeStream) -> JoinHandle<()> {
        tokio::spawn(self.clone().run_reconcile(stream))
    }

    fn emit(&self, event: SessionEvent) {
        debug!(?event, "SessionHandle::emit");
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
