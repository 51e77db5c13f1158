use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::*;
use crate::actor::invoker::Invoker;
use crate::actor::messages::InvocationResult;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

/// Invoker that blocks until the test hands it a result.
struct GatedInvoker {
    started: mpsc::UnboundedSender<i64>,
    release: Mutex<std::sync::mpsc::Receiver<InvocationResult>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl Invoker for GatedInvoker {
    fn execute(&self, watermark: i64, _snapshot: Option<&ProjectToWatch>) -> InvocationResult {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.started.send(watermark);

        let result = self
            .release
            .lock()
            .recv()
            .unwrap_or_else(|_| InvocationResult::failure(None, "test ended".into(), 0));

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

struct Harness {
    invoker: Arc<GatedInvoker>,
    started: mpsc::UnboundedReceiver<i64>,
    release: std::sync::mpsc::Sender<InvocationResult>,
}

impl Harness {
    fn new() -> Self {
        let (started_tx, started) = mpsc::unbounded_channel();
        let (release, release_rx) = std::sync::mpsc::channel();
        let invoker = Arc::new(GatedInvoker {
            started: started_tx,
            release: Mutex::new(release_rx),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        });
        Self {
            invoker,
            started,
            release,
        }
    }

    fn dispatcher(&self, project_path: &str) -> DispatcherHandle {
        Dispatcher::with_invoker("p1", project_path, self.invoker.clone())
    }

    async fn next_start(&mut self) -> i64 {
        timeout(WAIT, self.started.recv())
            .await
            .expect("invocation did not start")
            .expect("invoker dropped")
    }

    async fn assert_idle(&mut self) {
        assert!(
            timeout(QUIET, self.started.recv()).await.is_err(),
            "unexpected invocation"
        );
    }

    fn finish(&self, result: InvocationResult) {
        self.release.send(result).unwrap();
    }

    fn calls(&self) -> usize {
        self.invoker.calls.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn test_creation_time_seeds_first_invocation() {
    let mut h = Harness::new();
    let handle = h.dispatcher("/work/app");

    handle.submit(1000, None).unwrap();
    assert_eq!(h.next_start().await, 1000);

    h.finish(InvocationResult::success(String::new(), 2000));
    h.assert_idle().await;
    assert_eq!(h.calls(), 1);
}

#[tokio::test]
async fn test_burst_during_flight_gives_one_follow_up() {
    let mut h = Harness::new();
    let handle = h.dispatcher("/work/app");

    handle.submit(0, None).unwrap();
    assert_eq!(h.next_start().await, 0);

    for _ in 0..25 {
        handle.submit(0, None).unwrap();
    }
    h.assert_idle().await;

    h.finish(InvocationResult::success(String::new(), 5000));
    assert_eq!(h.next_start().await, 5000);

    h.finish(InvocationResult::success(String::new(), 6000));
    h.assert_idle().await;
    assert_eq!(h.calls(), 2);
}

#[tokio::test]
async fn test_failed_invocation_retries_with_same_watermark() {
    let mut h = Harness::new();
    let handle = h.dispatcher("/work/app");

    handle.submit(1000, None).unwrap();
    assert_eq!(h.next_start().await, 1000);

    h.finish(InvocationResult::failure(Some(1), "boom".into(), 9999));
    // No automatic retry
    h.assert_idle().await;

    handle.submit(0, None).unwrap();
    assert_eq!(h.next_start().await, 1000);
    h.finish(InvocationResult::success(String::new(), 12_000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_coalesce_into_one_follow_up() {
    let mut h = Harness::new();
    let handle = h.dispatcher("/work/app");

    handle.submit(0, None).unwrap();
    assert_eq!(h.next_start().await, 0);

    let producers: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    handle.submit(0, None).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    // All 800 changes are queued ahead of the completion
    h.finish(InvocationResult::success(String::new(), 1000));
    assert_eq!(h.next_start().await, 1000);
    h.finish(InvocationResult::success(String::new(), 2000));

    h.assert_idle().await;
    assert_eq!(h.calls(), 2);
    assert_eq!(h.invoker.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_project_path_is_rejected() {
    let mut h = Harness::new();
    let handle = h.dispatcher("   ");

    assert_eq!(handle.submit(1000, None), Err(SubmitError::EmptyProjectPath));
    h.assert_idle().await;
}

#[test]
fn test_empty_command_path_fails_construction() {
    let command = SyncCommand {
        project_id: "p1".into(),
        project_path: "/work/app".into(),
        command_path: PathBuf::new(),
        mock: None,
    };
    assert!(matches!(
        Dispatcher::spawn(command),
        Err(ConfigError::EmptyCommandPath)
    ));
}

#[test]
fn test_submit_after_runtime_shutdown() {
    let h = Harness::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let handle = runtime.block_on(async { h.dispatcher("/work/app") });
    drop(runtime);

    assert_eq!(handle.submit(0, None), Err(SubmitError::Closed));
}

#[tokio::test]
async fn test_actor_outlives_handles_until_worker_reports() {
    let mut h = Harness::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = DispatcherActor::new(Arc::from("p1"), rx, tx.downgrade(), h.invoker.clone());
    let task = tokio::spawn(actor.run());

    tx.send(DispatchMsg::Change(ChangeEvent::default())).unwrap();
    assert_eq!(h.next_start().await, 0);
    drop(tx);

    // Still waiting on the in-flight worker
    assert!(!task.is_finished());
    h.finish(InvocationResult::success(String::new(), 10));

    timeout(WAIT, task)
        .await
        .expect("actor did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_no_launch_once_every_handle_is_gone() {
    let mut h = Harness::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = DispatcherActor::new(Arc::from("p1"), rx, tx.downgrade(), h.invoker.clone());

    // Buffered change, but nobody left to hear the outcome
    tx.send(DispatchMsg::Change(ChangeEvent::default())).unwrap();
    drop(tx);

    timeout(WAIT, tokio::spawn(actor.run()))
        .await
        .expect("actor did not stop")
        .unwrap();
    h.assert_idle().await;
    assert_eq!(h.calls(), 0);
}
