// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

fn sample_items() -> Vec<PersistedItem> {
    vec![
        PersistedItem {
            id: 1,
            task_name: "build-linux".into(),
            in_queue_since_epoch_ms: 1000,
            stage: PersistedStage::Waiting {
                due_at_epoch_ms: 2000,
            },
        },
        PersistedItem {
            id: 2,
            task_name: "build-windows".into(),
            in_queue_since_epoch_ms: 1500,
            stage: PersistedStage::Buildable,
        },
    ]
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    save(&path, &sample_items()).expect("save");

    match load(&path, 3).expect("load") {
        LoadedQueue::Structured(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].task_name, "build-linux");
            assert_eq!(items[1].task_name, "build-windows");
        }
        _ => panic!("expected structured queue"),
    }
}

#[test]
fn successful_load_rotates_source_to_bak() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    save(&path, &sample_items()).expect("save");

    match load(&path, 3).expect("load") {
        LoadedQueue::Structured(items) => assert_eq!(items.len(), 2),
        _ => panic!("expected structured queue"),
    }
    assert!(!path.exists());
    assert!(dir.path().join("queue.bak").exists());
}

#[test]
fn missing_file_is_reported_as_missing() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    match load(&path, 3).expect("load") {
        LoadedQueue::Missing => {}
        _ => panic!("expected missing"),
    }
}

#[test]
fn corrupt_file_is_rotated_to_bak_and_treated_as_missing() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    std::fs::write(&path, b"not json { [ garbage").expect("write garbage");

    match load(&path, 3).expect("load") {
        LoadedQueue::Missing => {}
        _ => panic!("expected missing after corrupt load"),
    }
    assert!(!path.exists());
    assert!(dir.path().join("queue.bak").exists());
}

#[test]
fn legacy_text_file_is_detected_parsed_and_deleted() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    let legacy = dir.path().join("queue.txt");
    std::fs::write(&legacy, "build-linux\nbuild-windows\n").expect("write legacy");

    match load(&path, 3).expect("load") {
        LoadedQueue::Legacy(names) => {
            assert_eq!(names, vec!["build-linux", "build-windows"]);
        }
        other => panic!("expected legacy, got {other:?}", other = debug_variant(&other)),
    }
    assert!(!legacy.exists());
}

#[test]
fn legacy_file_takes_priority_over_structured_file() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");
    let legacy = dir.path().join("queue.txt");
    save(&path, &sample_items()).expect("save structured");
    std::fs::write(&legacy, "build-macos\n").expect("write legacy");

    match load(&path, 3).expect("load") {
        LoadedQueue::Legacy(names) => assert_eq!(names, vec!["build-macos"]),
        other => panic!("expected legacy, got {other:?}", other = debug_variant(&other)),
    }
}

fn debug_variant(q: &LoadedQueue) -> &'static str {
    match q {
        LoadedQueue::Structured(_) => "structured",
        LoadedQueue::Legacy(_) => "legacy",
        LoadedQueue::Missing => "missing",
    }
}

#[test]
fn bak_rotation_keeps_bounded_history() {
    let dir = tempdir().expect("tmpdir");
    let path = dir.path().join("queue.json");

    for _ in 0..5 {
        std::fs::write(&path, b"garbage").expect("write garbage");
        load(&path, 3).expect("load");
    }

    assert!(dir.path().join("queue.bak").exists());
    assert!(dir.path().join("queue.bak.2").exists());
    assert!(dir.path().join("queue.bak.3").exists());
    assert!(!dir.path().join("queue.bak.4").exists());
}
