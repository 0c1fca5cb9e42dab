//! Watcher to session reconcile pipeline against a real directory

use std::fs;
use std::time::Duration;

use promptpack::config::Config;
use promptpack::{ChangeWatcher, Session, SessionEvent, SessionHandle};
use serial_test::serial;
use tempfile::TempDir;
use tokio::sync::broadcast;

fn config() -> Config {
    let mut config = Config::default();
    config.watch.debounce_ms = 100;
    config
}

fn project() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/lib.rs"), "pub mod a;").unwrap();
    fs::write(temp.path().join("src/a.rs"), "pub fn a() {}").unwrap();
    temp
}

/// Start the pipeline and return the handle plus a subscribed receiver
fn start(temp: &TempDir, config: &Config) -> (SessionHandle, broadcast::Receiver<SessionEvent>) {
    let session = Session::open(temp.path(), config).expect("Failed to open session");
    let stream = ChangeWatcher::start(session.base(), &config.watch, &config.scan).expect("Failed to start watcher");
    let handle = SessionHandle::new(session);
    let events = handle.subscribe();
    handle.spawn_reconcile(stream);
    (handle, events)
}

/// Wait for a rescan after which `check` holds on the session
async fn wait_until<F>(handle: &SessionHandle, events: &mut broadcast::Receiver<SessionEvent>, check: F)
where
    F: Fn(&Session) -> bool,
{
    let waited = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Rescanned { .. }) => {
                    if check(&*handle.lock().await) {
                        return;
                    }
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("Event channel closed"),
            }
        }
    })
    .await;
    assert!(waited.is_ok(), "Timed out waiting for reconcile");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_deleted_file_leaves_selection() {
    let temp = project();
    let config = config();
    let (handle, mut events) = start(&temp, &config);
    handle.lock().await.select("src").unwrap();

    fs::remove_file(temp.path().join("src/a.rs")).unwrap();

    wait_until(&handle, &mut events, |s| !s.catalog().contains("src/a.rs")).await;
    let session = handle.lock().await;
    assert!(!session.selection().contains("src/a.rs"));
    assert!(session.selection().contains("src/lib.rs"));

    let prompt = session.compose().unwrap();
    assert_eq!(prompt.included, vec!["src/lib.rs"]);
    assert!(prompt.skipped.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_new_file_appears_unselected() {
    let temp = project();
    let config = config();
    let (handle, mut events) = start(&temp, &config);
    handle.lock().await.select_all();

    fs::write(temp.path().join("src/b.rs"), "pub fn b() {}").unwrap();

    wait_until(&handle, &mut events, |s| s.catalog().contains("src/b.rs")).await;
    let session = handle.lock().await;
    assert!(!session.selection().contains("src/b.rs"));
    assert_eq!(session.selection().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_hidden_changes_do_not_rescan() {
    let temp = project();
    let config = config();
    let (_handle, mut events) = start(&temp, &config);

    fs::write(temp.path().join(".scratch"), "ignored").unwrap();

    let got = tokio::time::timeout(Duration::from_millis(600), events.recv()).await;
    assert!(got.is_err(), "Hidden file change should not trigger a re-scan");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_output_file_inside_base_does_not_retrigger() {
    let temp = project();
    let config = config();
    let base = temp.path().canonicalize().unwrap();
    let output = base.join("prompt.md");
    fs::write(&output, "initial").unwrap();

    let mut stream =
        ChangeWatcher::start_ignoring(&base, &config.watch, &config.scan, vec![output.clone()]).unwrap();

    for round in 0..3 {
        fs::write(&output, format!("rewrite {round}")).unwrap();
    }
    let got = tokio::time::timeout(Duration::from_millis(600), stream.next()).await;
    assert!(got.is_err(), "Writing the output file should not signal a change");

    fs::write(base.join("src/c.rs"), "pub fn c() {}").unwrap();
    let signal = tokio::time::timeout(Duration::from_secs(10), stream.next())
        .await
        .expect("signal within timeout")
        .expect("stream open");
    assert!(signal.paths.iter().all(|p| p != &output));
}
