use std::sync::Arc;
use std::thread;

use topicforge_core::QueueItemState;

use super::create_test_store;

#[test]
fn enqueue_returns_new_id_then_dedupes() {
    let (store, _temp_dir) = create_test_store();

    let (id1, created1) = store.enqueue("Learn Rust ownership").unwrap();
    assert!(created1);

    let (id2, created2) = store.enqueue("Learn Rust ownership").unwrap();
    assert_eq!(id1, id2);
    assert!(!created2);
}

#[test]
fn enqueue_preserves_original_title_byte_for_byte() {
    let (store, _temp_dir) = create_test_store();
    let raw = "24. **Why memory generations optimize GC**";
    let (id, _) = store.enqueue(raw).unwrap();

    let item = store.lookup_by_title(raw).unwrap().unwrap();
    assert_eq!(item.id, id);
    assert_eq!(item.original_title, raw);
}

#[test]
fn claim_pending_transitions_to_processing_fifo() {
    let (store, _temp_dir) = create_test_store();
    store.enqueue("first").unwrap();
    store.enqueue("second").unwrap();
    store.enqueue("third").unwrap();

    let claimed = store.claim_pending(2).unwrap();
    assert_eq!(claimed.len(), 2);
    assert_eq!(claimed[0].original_title, "first");
    assert_eq!(claimed[1].original_title, "second");
    assert!(claimed.iter().all(|i| i.state == QueueItemState::Processing));

    let counts = store.count_by_state().unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.processing, 2);
}

#[test]
fn complete_writes_topic_and_marks_completed() {
    let (store, _temp_dir) = create_test_store();
    let (id, _) = store.enqueue("raw title").unwrap();
    store.claim_pending(1).unwrap();

    store
        .complete(
            id,
            "Clean Title",
            "a description",
            "rust",
            &["rust".to_owned(), "async".to_owned()],
            &["tokio".to_owned()],
            "intermediate",
            &serde_json::json!({}),
        )
        .unwrap();

    let item = store.lookup_by_title("raw title").unwrap().unwrap();
    assert_eq!(item.state, QueueItemState::Completed);
    assert_eq!(item.current_title.as_deref(), Some("Clean Title"));

    let topics = store.list_topics(None, 1, 10).unwrap();
    assert_eq!(topics.total, 1);
    assert_eq!(topics.items[0].title, "Clean Title");
    assert_eq!(topics.items[0].queue_item_id, id);
}

#[test]
fn fail_on_a_row_previously_failed_is_reused_on_resubmit() {
    let (store, _temp_dir) = create_test_store();
    let (id, _) = store.enqueue("flaky title").unwrap();
    store.claim_pending(1).unwrap();
    store.fail(id, "llm exploded").unwrap();

    let failed = store.lookup_by_title("flaky title").unwrap().unwrap();
    assert_eq!(failed.state, QueueItemState::Failed);

    let (resubmit_id, created) = store.enqueue("flaky title").unwrap();
    assert_eq!(resubmit_id, id);
    assert!(!created);

    let reset = store.lookup_by_title("flaky title").unwrap().unwrap();
    assert_eq!(reset.state, QueueItemState::Pending);
    assert!(reset.error_message.is_none());
}

#[test]
fn resubmitting_a_failed_row_resets_retry_count() {
    let (store, _temp_dir) = create_test_store();
    let (id, _) = store.enqueue("flaky retry title").unwrap();

    store.claim_pending(1).unwrap();
    store.requeue_transient(id, "timeout", 5).unwrap();
    store.claim_pending(1).unwrap();
    store.requeue_transient(id, "timeout", 5).unwrap();
    let item = store.lookup_by_title("flaky retry title").unwrap().unwrap();
    assert_eq!(item.retry_count, 2);

    store.claim_pending(1).unwrap();
    store.fail(id, "gave up").unwrap();

    let (resubmit_id, created) = store.enqueue("flaky retry title").unwrap();
    assert_eq!(resubmit_id, id);
    assert!(!created);

    let reset = store.lookup_by_title("flaky retry title").unwrap().unwrap();
    assert_eq!(reset.retry_count, 0);
    assert_eq!(reset.state, QueueItemState::Pending);
}

#[test]
fn complete_on_an_unknown_id_returns_not_found() {
    let (store, _temp_dir) = create_test_store();
    let err = store
        .complete(999_999, "title", "desc", "cat", &[], &[], "beginner", &serde_json::json!({}))
        .unwrap_err();
    assert!(matches!(err, crate::StorageError::NotFound { .. }));
}

#[test]
fn requeue_transient_caps_at_max_retry() {
    let (store, _temp_dir) = create_test_store();
    let (id, _) = store.enqueue("retry me").unwrap();

    store.claim_pending(1).unwrap();
    store.requeue_transient(id, "timeout", 3).unwrap();
    let item = store.lookup_by_title("retry me").unwrap().unwrap();
    assert_eq!(item.state, QueueItemState::Pending);
    assert_eq!(item.retry_count, 1);

    store.claim_pending(1).unwrap();
    store.requeue_transient(id, "timeout", 3).unwrap();
    store.claim_pending(1).unwrap();
    store.requeue_transient(id, "timeout", 3).unwrap();

    let item = store.lookup_by_title("retry me").unwrap().unwrap();
    assert_eq!(item.state, QueueItemState::Failed);
    assert_eq!(item.retry_count, 3);
    assert_eq!(item.error_message.as_deref(), Some("timeout"));
}

#[test]
fn reset_stale_reclaims_old_processing_rows() {
    let (store, _temp_dir) = create_test_store();
    store.enqueue("stuck").unwrap();
    store.claim_pending(1).unwrap();

    let reclaimed = store.reset_stale(0).unwrap();
    assert_eq!(reclaimed, 1);

    let counts = store.count_by_state().unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.processing, 0);
}

#[test]
fn recent_failures_returns_newest_first() {
    let (store, _temp_dir) = create_test_store();
    for title in ["a", "b", "c"] {
        let (id, _) = store.enqueue(title).unwrap();
        store.claim_pending(1).unwrap();
        store.fail(id, "boom").unwrap();
    }

    let failures = store.recent_failures(2).unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].original_title, "c");
    assert_eq!(failures[1].original_title, "b");
}

#[test]
fn concurrent_enqueue_of_the_same_new_title_dedupes_to_one_row() {
    let (store, _temp_dir) = create_test_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.enqueue("Same Brand-New Title").unwrap())
        })
        .collect();

    let results: Vec<(i64, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ids: Vec<i64> = results.iter().map(|(id, _)| *id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]), "every caller must get the same id: {ids:?}");
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1, "exactly one caller creates the row");

    let item = store.lookup_by_title("Same Brand-New Title").unwrap().unwrap();
    assert_eq!(item.id, ids[0]);
    assert_eq!(item.state, QueueItemState::Pending);
}

#[test]
fn concurrent_claims_never_overlap() {
    let (store, _temp_dir) = create_test_store();
    let store = Arc::new(store);
    for i in 0..100 {
        store.enqueue(&format!("title-{i}")).unwrap();
    }

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.claim_pending(10).unwrap().into_iter().map(|item| item.id).collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_ids: Vec<i64> =
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    let total = all_ids.len();
    all_ids.sort_unstable();
    all_ids.dedup();
    assert_eq!(total, 100);
    assert_eq!(all_ids.len(), 100);
}
