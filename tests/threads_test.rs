use chrono::{TimeZone, Utc};
use feed_sync::{CommentRecord, InMemoryCommentStore, ThreadBuilder, ThreadLoader};
use std::collections::HashMap;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

fn comment(id: &str, seconds: i64, parent: Option<&str>) -> CommentRecord {
    CommentRecord {
        id: id.to_string(),
        content: format!("comment {}", id),
        author: "tester".to_string(),
        created_at: Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap(),
        parent_id: parent.map(str::to_string),
    }
}

#[test]
fn builds_two_level_tree_in_order() {
    init_tracing();

    let top_level = vec![comment("a", 5, None), comment("b", 3, None)];
    let mut replies = HashMap::new();
    replies.insert("a".to_string(), vec![comment("r1", 6, Some("a"))]);

    let nodes = ThreadBuilder::build(top_level, replies);

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].record.id, "a");
    assert_eq!(nodes[0].replies.len(), 1);
    assert_eq!(nodes[0].replies[0].record.id, "r1");
    assert_eq!(nodes[1].record.id, "b");
    assert!(nodes[1].replies.is_empty());
}

#[test]
fn top_level_newest_first_replies_oldest_first() {
    init_tracing();

    // Deliberately unsorted inputs.
    let top_level = vec![
        comment("old", 1, None),
        comment("new", 9, None),
        comment("mid", 4, None),
    ];
    let mut replies = HashMap::new();
    replies.insert(
        "mid".to_string(),
        vec![
            comment("r-late", 8, Some("mid")),
            comment("r-early", 5, Some("mid")),
            comment("r-mid", 6, Some("mid")),
        ],
    );

    let nodes = ThreadBuilder::build(top_level, replies);

    let order: Vec<&str> = nodes.iter().map(|n| n.record.id.as_str()).collect();
    assert_eq!(order, vec!["new", "mid", "old"]);

    let reply_order: Vec<&str> = nodes[1]
        .replies
        .iter()
        .map(|n| n.record.id.as_str())
        .collect();
    assert_eq!(reply_order, vec!["r-early", "r-mid", "r-late"]);
}

#[test]
fn orphan_replies_are_dropped() {
    init_tracing();

    let top_level = vec![comment("a", 5, None)];
    let mut replies = HashMap::new();
    replies.insert("a".to_string(), vec![comment("r1", 6, Some("a"))]);
    replies.insert("ghost".to_string(), vec![comment("lost", 7, Some("ghost"))]);

    let nodes = ThreadBuilder::build(top_level, replies);

    assert_eq!(nodes.len(), 1);
    let all_reply_ids: Vec<&str> = nodes
        .iter()
        .flat_map(|n| n.replies.iter().map(|r| r.record.id.as_str()))
        .collect();
    assert_eq!(all_reply_ids, vec!["r1"]);
}

#[test]
fn stray_reply_rows_in_top_level_are_skipped() {
    init_tracing();

    let top_level = vec![
        comment("a", 5, None),
        // A reply row that leaked into the top-level result set.
        comment("r1", 6, Some("a")),
    ];

    let nodes = ThreadBuilder::build(top_level, HashMap::new());

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].record.id, "a");
}

#[test]
fn empty_input_builds_empty_tree() {
    let nodes = ThreadBuilder::build(Vec::new(), HashMap::new());
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn loader_fetches_and_rebuilds_thread() {
    init_tracing();

    let store = Arc::new(InMemoryCommentStore::new());
    store.add_top_level("post-1", comment("c1", 10, None)).await;
    store.add_top_level("post-1", comment("c2", 20, None)).await;
    store.add_reply(comment("r2", 40, Some("c1"))).await;
    store.add_reply(comment("r1", 30, Some("c1"))).await;
    // Reply to a comment that is not in post-1's top-level set.
    store.add_reply(comment("stray", 50, Some("elsewhere"))).await;

    let loader = ThreadLoader::new(store.clone());
    let nodes = loader.load("post-1").await.unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].record.id, "c2");
    assert!(nodes[0].replies.is_empty());
    assert_eq!(nodes[1].record.id, "c1");
    let reply_order: Vec<&str> = nodes[1]
        .replies
        .iter()
        .map(|n| n.record.id.as_str())
        .collect();
    assert_eq!(reply_order, vec!["r1", "r2"]);

    // A content id with no comments is an empty tree, not an error.
    let empty = loader.load("post-2").await.unwrap();
    assert!(empty.is_empty());
}
