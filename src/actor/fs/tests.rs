use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::debouncer::{Debouncer, is_temp_file};
use super::types::ChangeKind;
use super::watch_roots::WatchRoots;
use super::{FsWatcher, relevant_changes};
use crate::actor::dispatcher::Dispatcher;
use crate::actor::invoker::Invoker;
use crate::actor::messages::InvocationResult;
use crate::project::ProjectToWatch;
use crate::utils::path::normalize_path;

const WINDOW: Duration = Duration::from_millis(50);

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_debouncer_empty() {
    let mut debouncer = Debouncer::new(WINDOW);
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_burst_released_after_quiet_window() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.rs", "/tmp/b.rs"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.rs"], modify_kind()));

    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= WINDOW);

    std::thread::sleep(WINDOW + Duration::from_millis(10));
    let changes = debouncer.take_if_ready().unwrap();
    assert_eq!(changes.len(), 2);
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_metadata_only_changes_ignored() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(
        vec!["/tmp/a.rs"],
        notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::Any,
        )),
    ));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_skipped() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(
        vec!["/tmp/.main.rs.swp", "/tmp/main.rs~", "/tmp/main.rs"],
        modify_kind(),
    ));
    assert_eq!(debouncer.changes.len(), 1);

    assert!(is_temp_file(Path::new("/x/notes.tmp")));
    assert!(is_temp_file(Path::new("/x/.#main.rs")));
    assert!(!is_temp_file(Path::new("/x/.gitignore")));
}

#[test]
fn test_create_then_remove_cancels_out() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/scratch.rs"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/scratch.rs"], remove_kind()));
    assert!(debouncer.changes.is_empty());

    // Window closes without a burst, then goes idle
    std::thread::sleep(WINDOW + Duration::from_millis(10));
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_change_kind_merging() {
    use ChangeKind::*;
    assert_eq!(Created.then(Removed), None);
    assert_eq!(Removed.then(Created), Some(Created));
    assert_eq!(Removed.then(Modified), Some(Modified));
    assert_eq!(Modified.then(Removed), Some(Removed));
    assert_eq!(Created.then(Modified), Some(Created));
}

#[test]
fn test_relevant_changes_apply_ignore_rules() {
    let root = Path::new("/work/app");
    let project = ProjectToWatch {
        ignored_filenames: vec!["*.log".into()],
        ignored_paths: vec!["/target".into()],
        ..Default::default()
    };
    let changes = vec![
        (PathBuf::from("/work/app/target/debug/app"), ChangeKind::Modified),
        (PathBuf::from("/work/app/src/main.rs"), ChangeKind::Modified),
        (PathBuf::from("/work/app/run.log"), ChangeKind::Created),
        (PathBuf::from("/work/app/Cargo.toml"), ChangeKind::Modified),
    ];

    let relevant = relevant_changes(changes, root, &project);
    let paths: Vec<_> = relevant.iter().map(|(p, _)| p.as_path()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new("/work/app/Cargo.toml"),
            Path::new("/work/app/src/main.rs")
        ]
    );
}

#[test]
fn test_watch_roots_attach_late() {
    let temp = TempDir::new().unwrap();
    let present = temp.path().join("present");
    let later = temp.path().join("later");
    std::fs::create_dir_all(&present).unwrap();

    let mut watcher = notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap();
    let mut roots = WatchRoots::new(vec![present, later.clone()]);

    assert_eq!(roots.attach(&mut watcher).unwrap(), 1);
    assert_eq!(roots.missing().collect::<Vec<_>>(), vec![&later]);

    std::fs::create_dir_all(&later).unwrap();
    assert_eq!(roots.attach(&mut watcher).unwrap(), 1);
    assert_eq!(roots.attached(), 2);
    assert_eq!(roots.attach(&mut watcher).unwrap(), 0);
}

/// Reports each invocation's snapshot project id and succeeds at once.
struct RecordingInvoker {
    calls: mpsc::UnboundedSender<Option<String>>,
}

impl Invoker for RecordingInvoker {
    fn execute(&self, _watermark: i64, snapshot: Option<&ProjectToWatch>) -> InvocationResult {
        let _ = self.calls.send(snapshot.map(|s| s.project_id.clone()));
        InvocationResult::success(String::new(), 1)
    }
}

#[tokio::test]
async fn test_file_change_reaches_dispatcher() {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    let (calls_tx, mut calls) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::with_invoker(
        "p1",
        &root.display().to_string(),
        Arc::new(RecordingInvoker { calls: calls_tx }),
    );

    let project = Arc::new(ProjectToWatch {
        project_id: "p1".into(),
        ignored_filenames: vec!["*.log".into()],
        ..Default::default()
    });
    let watcher =
        FsWatcher::new(vec![root.clone()], &root, project, dispatcher, WINDOW).unwrap();
    tokio::spawn(watcher.run());

    // Ignored files alone never trigger a sync
    std::fs::write(root.join("build.log"), "noise").unwrap();
    assert!(
        timeout(Duration::from_millis(500), calls.recv())
            .await
            .is_err()
    );

    std::fs::write(root.join("main.rs"), "fn main() {}").unwrap();
    let call = timeout(Duration::from_secs(5), calls.recv())
        .await
        .expect("no sync after file change")
        .unwrap();
    assert_eq!(call.as_deref(), Some("p1"));
}

#[tokio::test]
async fn test_root_created_after_start_is_watched() {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    let later = root.join("later");
    let (calls_tx, mut calls) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::with_invoker(
        "p1",
        &root.display().to_string(),
        Arc::new(RecordingInvoker { calls: calls_tx }),
    );

    let project = Arc::new(ProjectToWatch {
        project_id: "p1".into(),
        ..Default::default()
    });
    let watcher =
        FsWatcher::new(vec![later.clone()], &root, project, dispatcher, WINDOW).unwrap();
    tokio::spawn(watcher.run());

    // Nothing else happens meanwhile; the watcher is idle
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::create_dir_all(&later).unwrap();

    let mut synced = false;
    for i in 0..25 {
        std::fs::write(later.join(format!("file{i}.rs")), "fn f() {}").unwrap();
        if timeout(Duration::from_millis(400), calls.recv()).await.is_ok() {
            synced = true;
            break;
        }
    }
    assert!(synced, "root created after start was never watched");
}
