use super::create_test_store;

fn complete_one(store: &crate::Store, title: &str, category: &str) {
    let (id, _) = store.enqueue(title).unwrap();
    store.claim_pending(1).unwrap();
    store
        .complete(id, title, "desc", category, &[], &[], "beginner", &serde_json::json!({}))
        .unwrap();
}

#[test]
fn list_topics_paginates_newest_first() {
    let (store, _temp_dir) = create_test_store();
    for title in ["t1", "t2", "t3"] {
        complete_one(&store, title, "rust");
    }

    let page1 = store.list_topics(None, 1, 2).unwrap();
    assert_eq!(page1.total, 3);
    assert_eq!(page1.items.len(), 2);
    assert_eq!(page1.items[0].title, "t3");

    let page2 = store.list_topics(None, 2, 2).unwrap();
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].title, "t1");
}

#[test]
fn list_topics_filters_by_category() {
    let (store, _temp_dir) = create_test_store();
    complete_one(&store, "rust topic", "rust");
    complete_one(&store, "go topic", "go");

    let rust_only = store.list_topics(Some("rust"), 1, 10).unwrap();
    assert_eq!(rust_only.total, 1);
    assert_eq!(rust_only.items[0].title, "rust topic");
}

#[test]
fn fingerprint_cache_roundtrips() {
    let (store, _temp_dir) = create_test_store();
    assert_eq!(store.fingerprint_get("k").unwrap(), None);

    store.fingerprint_put("k", b"cached blob").unwrap();
    assert_eq!(store.fingerprint_get("k").unwrap(), Some(b"cached blob".to_vec()));

    store.fingerprint_put("k", b"updated blob").unwrap();
    assert_eq!(store.fingerprint_get("k").unwrap(), Some(b"updated blob".to_vec()));
}
