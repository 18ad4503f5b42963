//! File-backed persistence: restart survival, full rewrite, corrupt-file
//! fallback, unwritable paths, capacity changes across reopen.
//!
//! Every test uses a tempdir so the real image is written and re-read.

use std::collections::HashMap;

use visits_storage::codec;
use visits_storage::{Timestamp, Visit, VisitError, VisitStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn snapshot(store: &mut VisitStore, user_id: u32) -> HashMap<u32, Visit> {
    store
        .recent_visits(user_id)
        .iter()
        .map(|v| (v.visit_id(), v.clone()))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// RESTART SURVIVAL
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn visits_survive_restart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.dat");

    let (before_4, before_5) = {
        let mut store = VisitStore::open(&path, 5).unwrap();
        store.add_visit(4, 401, "https://example.com/persist1", "Persist 1").unwrap();
        store.add_visit(4, 402, "https://example.com/persist2", "Persist 2").unwrap();
        store.add_visit(5, 501, "https://example.org/ünïcode", "テキスト").unwrap();
        let snap = (snapshot(&mut store, 4), snapshot(&mut store, 5));
        store.close();
        snap
    };

    let mut store = VisitStore::open(&path, 5).unwrap();
    assert_eq!(store.user_ids(), vec![4, 5]);
    assert_eq!(snapshot(&mut store, 4), before_4);
    assert_eq!(snapshot(&mut store, 5), before_5);

    // And the reopened store keeps working.
    store.add_visit(4, 403, "https://example.com/persist3", "Persist 3").unwrap();
    assert_eq!(store.visit_count(4), 3);
}

#[test]
fn delete_and_clear_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mutations.dat");
    {
        let mut store = VisitStore::open(&path, 5).unwrap();
        for id in 1..=3 {
            store
                .add_visit_at(1, id, "u", "t", Timestamp::new(i64::from(id), 0))
                .unwrap();
        }
        store.add_visit_at(2, 9, "u", "t", Timestamp::new(9, 0)).unwrap();
        assert!(store.delete_visits(1, &[2]));
        store.clear_user(2);
    }

    let mut store = VisitStore::open(&path, 5).unwrap();
    let ids: Vec<u32> = store.recent_visits(1).iter().map(Visit::visit_id).collect();
    assert_eq!(ids, vec![3, 1]);
    // Cleared users persist as empty entries.
    assert!(store.contains_user(2));
    assert_eq!(store.visit_count(2), 0);
}

#[test]
fn every_mutation_rewrites_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rewrite.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();

    store.add_visit(1, 1, "https://a", "a").unwrap();
    let after_add = std::fs::read(&path).unwrap();
    assert_eq!(codec::decode(&after_add, 5).unwrap().users[0].len(), 1);

    assert!(store.delete_visits(1, &[1]));
    let after_delete = std::fs::read(&path).unwrap();
    assert!(after_delete.len() < after_add.len());
    assert_eq!(codec::decode(&after_delete, 5).unwrap().users[0].len(), 0);
}

#[test]
fn failed_delete_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("untouched.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();
    store.add_visit(1, 1, "https://a", "a").unwrap();

    // Replace the image behind the store's back; a no-op delete must not
    // overwrite it.
    std::fs::write(&path, b"sentinel").unwrap();
    assert!(!store.delete_visits(1, &[404]));
    assert_eq!(std::fs::read(&path).unwrap(), b"sentinel");
}

#[test]
fn duplicate_add_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();
    store.add_visit(1, 1, "https://a", "a").unwrap();

    std::fs::write(&path, b"sentinel").unwrap();
    assert!(!store.add_visit(1, 1, "https://a", "a").unwrap().is_stored());
    assert_eq!(std::fs::read(&path).unwrap(), b"sentinel");
}

#[test]
fn clear_known_empty_user_still_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clear.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();
    store.add_visit(1, 1, "https://a", "a").unwrap();
    store.clear_user(1);

    std::fs::write(&path, b"sentinel").unwrap();
    store.clear_user(1);
    assert_ne!(std::fs::read(&path).unwrap(), b"sentinel");
}

// ═══════════════════════════════════════════════════════════════════════════
// RECOVERY: corrupt, truncated, or unwritable files
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn truncated_file_falls_back_to_empty_store() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.dat");
    {
        let mut store = VisitStore::open(&path, 5).unwrap();
        store.add_visit(1, 1, "https://a", "a").unwrap();
        store.add_visit(2, 2, "https://b", "b").unwrap();
    }
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    let store = VisitStore::open(&path, 5).unwrap();
    assert_eq!(store.user_count(), 0, "partial state must not survive");
}

#[test]
fn garbage_file_falls_back_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.dat");
    std::fs::write(&path, b"not a visit store").unwrap();

    let mut store = VisitStore::open(&path, 5).unwrap();
    assert_eq!(store.user_count(), 0);

    // The next mutation replaces the garbage with a valid image.
    store.add_visit(1, 1, "https://a", "a").unwrap();
    drop(store);
    let store = VisitStore::open(&path, 5).unwrap();
    assert_eq!(store.visit_count(1), 1);
}

#[test]
fn empty_file_falls_back_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.dat");
    std::fs::write(&path, b"").unwrap();
    assert_eq!(VisitStore::open(&path, 5).unwrap().user_count(), 0);
}

#[test]
fn unwritable_path_keeps_mutation_in_memory() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("visits.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();

    let outcome = store.add_visit(1, 1, "https://a", "a").unwrap();
    assert!(outcome.is_stored());
    assert_eq!(store.visit_count(1), 1);
    assert!(!path.exists());

    assert!(matches!(store.save(), Err(VisitError::Persist { .. })));
}

#[test]
fn later_successful_save_includes_earlier_unpersisted_changes() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("late");
    let path = sub.join("visits.dat");
    let mut store = VisitStore::open(&path, 5).unwrap();
    store.add_visit(1, 1, "https://a", "a").unwrap();

    std::fs::create_dir(&sub).unwrap();
    store.add_visit(1, 2, "https://b", "b").unwrap();
    drop(store);

    let store = VisitStore::open(&path, 5).unwrap();
    assert_eq!(store.visit_count(1), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// CAPACITY ACROSS REOPEN
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn caller_capacity_wins_over_stored_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cap.dat");
    {
        let mut store = VisitStore::open(&path, 2).unwrap();
        store.add_visit_at(1, 1, "u", "t", Timestamp::new(1, 0)).unwrap();
        store.add_visit_at(1, 2, "u", "t", Timestamp::new(2, 0)).unwrap();
    }

    let mut store = VisitStore::open(&path, 4).unwrap();
    assert_eq!(store.max_visits(), 4);
    store.add_visit_at(1, 3, "u", "t", Timestamp::new(3, 0)).unwrap();
    store.add_visit_at(1, 4, "u", "t", Timestamp::new(4, 0)).unwrap();
    assert_eq!(store.visit_count(1), 4);
}

#[test]
fn smaller_capacity_on_reopen_keeps_file_order_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shrink.dat");
    {
        let mut store = VisitStore::open(&path, 4).unwrap();
        // Inserted oldest-first and never sorted, so the image is
        // oldest-first too.
        for id in 1..=4 {
            store
                .add_visit_at(1, id, "u", "t", Timestamp::new(i64::from(id), 0))
                .unwrap();
        }
    }

    let mut store = VisitStore::open(&path, 2).unwrap();
    let ids: Vec<u32> = store.recent_visits(1).iter().map(Visit::visit_id).collect();
    // The two oldest survive: truncation is by position, not by timestamp.
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn querying_before_save_changes_which_records_survive_shrink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sorted.dat");
    {
        let mut store = VisitStore::open(&path, 4).unwrap();
        for id in 1..=4 {
            store
                .add_visit_at(1, id, "u", "t", Timestamp::new(i64::from(id), 0))
                .unwrap();
        }
        // The query sorts in place; the next save writes newest-first.
        store.recent_visits(1);
        store.save().unwrap();
    }

    let mut store = VisitStore::open(&path, 2).unwrap();
    let ids: Vec<u32> = store.recent_visits(1).iter().map(Visit::visit_id).collect();
    assert_eq!(ids, vec![4, 3]);
}
