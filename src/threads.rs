use crate::traits::CommentStore;
use crate::types::{CommentNode, CommentRecord, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rebuilds the two-level reply tree from flat comment rows.
///
/// Pure over its inputs: the same rows always produce the same tree, and
/// nothing is mutated in place. Trees are rebuilt on every fetch.
pub struct ThreadBuilder;

impl ThreadBuilder {
    /// Attach replies to their top-level comments.
    ///
    /// Top-level nodes come out newest-first, each reply list oldest-first.
    /// A reply whose `parent_id` matches no top-level id is dropped without
    /// error: that is a consistency gap in the source rows, not a caller
    /// mistake. Rows in `top_level` that carry a `parent_id` are likewise
    /// skipped.
    pub fn build(
        top_level: Vec<CommentRecord>,
        replies_by_parent: HashMap<String, Vec<CommentRecord>>,
    ) -> Vec<CommentNode> {
        let mut replies_by_parent = replies_by_parent;

        let mut roots: Vec<CommentRecord> = top_level
            .into_iter()
            .filter(|record| record.parent_id.is_none())
            .collect();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut nodes = Vec::with_capacity(roots.len());
        for record in roots {
            let mut replies = replies_by_parent.remove(&record.id).unwrap_or_default();
            replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));

            let replies = replies
                .into_iter()
                .map(|reply| CommentNode {
                    record: reply,
                    replies: Vec::new(),
                })
                .collect();

            nodes.push(CommentNode { record, replies });
        }

        let orphans: usize = replies_by_parent.values().map(Vec::len).sum();
        if orphans > 0 {
            warn!("Dropped {} replies referencing absent parents", orphans);
        }

        nodes
    }
}

/// Drives the comment read API and feeds the builder: one fetch for the
/// top-level set, one per top-level comment for its replies.
pub struct ThreadLoader {
    store: Arc<dyn CommentStore>,
}

impl ThreadLoader {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, content_id: &str) -> Result<Vec<CommentNode>> {
        let top_level = self.store.top_level_comments(content_id).await?;
        debug!(
            "Loaded {} top-level comments for content {}",
            top_level.len(),
            content_id
        );

        let mut replies_by_parent = HashMap::with_capacity(top_level.len());
        for record in &top_level {
            let replies = self.store.replies(&record.id).await?;
            if !replies.is_empty() {
                replies_by_parent.insert(record.id.clone(), replies);
            }
        }

        Ok(ThreadBuilder::build(top_level, replies_by_parent))
    }
}
